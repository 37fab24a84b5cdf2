use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{
    create_teacher, delete_teacher, get_teacher, get_teachers, patch_teacher, update_teacher,
};

/// Teachers are read-only; the write routes exist to answer 405.
pub fn init_teachers_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_teachers).post(create_teacher))
        .route(
            "/{id}",
            get(get_teacher)
                .put(update_teacher)
                .patch(patch_teacher)
                .delete(delete_teacher),
        )
}
