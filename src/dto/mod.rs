pub mod application_dto;
pub mod interview_dto;
pub mod survey_dto;
pub mod webhook_dto;
