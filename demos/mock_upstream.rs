//! demos/mock_upstream.rs
//! Run: cargo run --example mock_upstream -- [port]
//! Then: cargo run -- demos/local.yaml

use hyper::{
    service::{make_service_fn, service_fn},
    Body, Request, Response, Server, StatusCode,
};
use std::{
    convert::Infallible,
    net::SocketAddr,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::time::sleep;

#[derive(Clone)]
struct UpstreamState {
    db_healthy: Arc<AtomicBool>,
}

fn reply(status: StatusCode, content_type: &str, body: String) -> Response<Body> {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    if let Ok(value) = content_type.parse() {
        response.headers_mut().insert(hyper::header::CONTENT_TYPE, value);
    }
    response
}

async fn handle(req: Request<Body>, state: UpstreamState) -> Result<Response<Body>, Infallible> {
    let path = req.uri().path().to_owned();
    let response = match path.as_str() {
        "/health" => reply(StatusCode::OK, "text/plain", "OK\n".into()),
        "/actuator/health" => {
            let db = if state.db_healthy.load(Ordering::SeqCst) { "UP" } else { "DOWN" };
            let body = format!(
                r#"{{"status":"{db}","components":{{"db":{{"status":"{db}","details":{{"database":"PostgreSQL","validationQuery":"isValid()"}}}},"diskSpace":{{"status":"UP","details":{{"total":499963174912,"free":91300069376,"threshold":10485760}}}},"ping":{{"status":"UP"}}}}}}"#
            );
            let status = if db == "UP" {
                StatusCode::OK
            } else {
                StatusCode::SERVICE_UNAVAILABLE
            };
            reply(status, "application/vnd.spring-boot.actuator.v3+json", body)
        }
        "/slow" => {
            sleep(Duration::from_secs(30)).await;
            reply(StatusCode::OK, "text/plain", "finally".into())
        }
        "/" => reply(
            StatusCode::OK,
            "text/html",
            "<!doctype html><title>mock</title>".into(),
        ),
        _ => reply(StatusCode::NOT_FOUND, "text/plain", "Not Found".into()),
    };
    Ok(response)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let port: u16 = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "8500".into())
        .parse()?;

    let state = UpstreamState {
        db_healthy: Arc::new(AtomicBool::new(true)),
    };

    // Flip the db component every 30 s so the dashboard has something to show.
    {
        let st = state.clone();
        tokio::spawn(async move {
            loop {
                sleep(Duration::from_secs(30)).await;
                let cur = st.db_healthy.load(Ordering::SeqCst);
                st.db_healthy.store(!cur, Ordering::SeqCst);
                println!("db component flipped → {}", if !cur { "UP" } else { "DOWN" });
            }
        });
    }

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let make_svc = make_service_fn(move |_conn| {
        let st = state.clone();
        async move { Ok::<_, Infallible>(service_fn(move |req| handle(req, st.clone()))) }
    });

    println!("Mock upstream on http://{addr}  [/health /actuator/health /slow /]");

    Server::bind(&addr).serve(make_svc).await?;
    Ok(())
}
