use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    let upload = OpenApiRouter::new()
        .routes(routes!(handlers::share::upload_share))
        .layer(handlers::share::upload_body_limit());

    let resolve = OpenApiRouter::new().routes(routes!(handlers::share::resolve_share));

    upload.merge(resolve)
}
