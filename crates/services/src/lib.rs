#![forbid(unsafe_code)]

pub mod app_services;
pub mod codec;
pub mod config;
pub mod error;
pub mod flow;
pub mod sheets;
pub mod submission_service;

pub use survey_core::Clock;

pub use app_services::SurveyServices;
pub use codec::{CodecError, InvalidToken, StateCodec, Token};
pub use config::{StoreTarget, SurveyConfig};
pub use error::{AppServicesError, ConfigError, FlowError, SubmissionError};
pub use flow::{Action, FlowStep, Notice, Screen, SurveyFlowService};
pub use sheets::{AccessTokenSource, ServiceAccountTokens, SheetsConfig, SheetsRepository};
pub use submission_service::SubmissionService;
