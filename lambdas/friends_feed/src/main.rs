use lambda_http::{run, service_fn, tracing};
use lambda_http::{Body, Error, Request, Response};
use pump_core::{handle_friends_feed, Config, PostgrestClient};

async fn function_handler(db: &PostgrestClient, event: Request) -> Result<Response<Body>, Error> {
    let response = handle_friends_feed(db, event.method(), event.body().as_ref()).await;
    Ok(response.map(Body::from))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    let db = PostgrestClient::new(&config);

    run(service_fn(|event| function_handler(&db, event))).await
}
