pub mod od_request;
pub mod reference;
pub mod track;
