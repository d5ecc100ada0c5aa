pub mod rag_query_route;
pub mod rag_request;
