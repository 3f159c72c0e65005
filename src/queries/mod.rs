pub mod lookup_queries;
pub mod product_queries;
pub mod reference_queries;
pub mod review_queries;
