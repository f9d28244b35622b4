mod handlers;
mod photos;
mod routes;
mod ws;

pub use routes::create_router;
