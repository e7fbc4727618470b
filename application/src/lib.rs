pub mod rag_service;
pub mod review_service;
