use domain_search::handlers::{EmbeddingsApiDoc, SearchApiDoc};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    components(schemas(axum_helpers::ErrorResponse)),
    info(
        title = "Search API",
        version = "0.1.0",
        description = "Semantic and hybrid search over the post corpus"
    ),
    servers(
        (url = "/api", description = "API base path")
    ),
    nest(
        (path = "/embeddings", api = EmbeddingsApiDoc),
        (path = "/search", api = SearchApiDoc)
    )
)]
pub struct ApiDoc;
