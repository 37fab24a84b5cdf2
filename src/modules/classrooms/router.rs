use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{
    create_classroom, delete_classroom, get_classroom, get_classrooms, patch_classroom,
    update_classroom,
};

pub fn init_classrooms_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_classrooms).post(create_classroom))
        .route(
            "/{id}",
            get(get_classroom)
                .put(update_classroom)
                .patch(patch_classroom)
                .delete(delete_classroom),
        )
}
