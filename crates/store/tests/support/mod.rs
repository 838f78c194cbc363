//! Fake catalog API served over real HTTP on an ephemeral port.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use serde_json::{Value, json};

#[derive(Default)]
pub struct CatalogState {
    pub products: Mutex<HashMap<u64, Value>>,
    pub stock: Mutex<HashMap<u64, i64>>,
    pub last_auth: Mutex<Option<String>>,
}

impl CatalogState {
    pub fn add_product(&self, id: u64, title: &str, price: f64, amount: i64) {
        self.products.lock().unwrap().insert(
            id,
            json!({
                "id": id,
                "title": title,
                "price": price,
                "image": format!("https://rocketseat.example.test/{id}.jpg"),
            }),
        );
        self.stock.lock().unwrap().insert(id, amount);
    }

    pub fn set_stock(&self, id: u64, amount: i64) {
        self.stock.lock().unwrap().insert(id, amount);
    }
}

fn remember_auth(state: &CatalogState, headers: &HeaderMap) {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    *state.last_auth.lock().unwrap() = auth;
}

async fn stock(
    State(state): State<Arc<CatalogState>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Result<Json<Value>, StatusCode> {
    remember_auth(&state, &headers);
    if id == 500 {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    let stock = state.stock.lock().unwrap();
    let amount = stock.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(json!({ "id": id, "amount": amount })))
}

async fn product(
    State(state): State<Arc<CatalogState>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Result<Json<Value>, StatusCode> {
    remember_auth(&state, &headers);
    let products = state.products.lock().unwrap();
    products
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

pub struct TestServer {
    pub base_url: String,
    pub state: Arc<CatalogState>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub async fn spawn() -> Self {
        let state = Arc::new(CatalogState::default());
        let app = Router::new()
            .route("/stock/:id", get(stock))
            .route("/products/:id", get(product))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            state,
            handle,
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
