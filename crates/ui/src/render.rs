use dioxus::prelude::*;

use crate::views::{Page, PageProps};
use crate::vm::PageVm;

const STYLE: &str = r"
body { font-family: sans-serif; background: #0e1117; color: #fafafa; margin: 0; }
.page { max-width: 1200px; margin: 0 auto; padding: 24px; }
.progress-label { text-align: center; }
.progress { height: 6px; background: #333; border-radius: 3px; margin-bottom: 24px; }
.progress-fill { height: 100%; background: #e694ff; border-radius: 3px; }
.intro-box { max-width: 640px; margin: 48px auto; line-height: 1.6; }
.intro-box h1 { text-align: center; color: #e694ff; }
.columns { display: flex; gap: 16px; }
.column { flex: 1; display: flex; flex-direction: column; align-items: center; }
.column img { width: 100%; }
.img-caption { text-align: center; font-size: 1.1em; margin-bottom: 8px; color: #aaa; }
.img-caption.highlight { color: #e694ff; }
.img-missing { padding: 48px 0; color: #666; }
form { width: 100%; margin-top: 10px; }
button { width: 100%; height: 3.5em; border-radius: 8px; font-weight: 600;
         border: 1px solid #555; background: transparent; color: inherit; cursor: pointer; }
button:hover { border-color: #e694ff; color: #e694ff; }
button.primary { background: #e694ff; color: #0e1117; }
.notice { padding: 12px 16px; border-radius: 8px; margin: 16px 0; }
.notice.success { background: #1c3d2a; }
.notice.error { background: #4a1c1c; }
";

// History navigation must re-request the address so the server re-derives the page.
const POPSTATE_SCRIPT: &str =
    "window.addEventListener('popstate', function () { window.location.reload(); });";

/// Renders a complete HTML document for `vm`.
#[must_use]
pub fn render_page(vm: PageVm) -> String {
    let title = vm.title;
    let mut dom = VirtualDom::new_with_props(Page, PageProps { vm });
    dom.rebuild_in_place();
    let body = dioxus_ssr::render(&dom);

    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n\
         <style>{STYLE}</style>\n\
         </head>\n\
         <body>\n\
         {body}\n\
         <script>{POPSTATE_SCRIPT}</script>\n\
         </body>\n\
         </html>\n"
    )
}
