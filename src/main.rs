mod api;
mod app_router;
mod auth_view;
mod context;
mod jar_view;
mod persisted_store;
mod query_cache;
mod write_view;
mod yew_app;

fn main() {
    yew_app::run_app();
}
