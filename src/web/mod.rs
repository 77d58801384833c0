// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Web UI for the Larder inventory dashboard
//!
//! All mutation funnels through the reconciler held in [`AppState`]; the
//! page handlers are read-only over that state. Engine calls complete
//! before the write lock is taken, so a failed call leaves the inventory
//! untouched.

use axum::{
    extract::{Multipart, Query, State},
    response::{Html, Json, Redirect},
    routing::{get, post},
    Form, Router,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::catalog::ItemName;
use crate::config::AppConfig;
use crate::engine::Engine;
use crate::inventory::{Entry, Inventory, StockStatus};
use crate::{forecast, recognize, LarderError};

/// Shared application state
pub struct AppState {
    pub inventory: RwLock<Inventory>,
    pub engine: Arc<dyn Engine>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig, engine: Arc<dyn Engine>) -> Self {
        Self {
            inventory: RwLock::new(Inventory::new()),
            engine,
            config,
        }
    }
}

/// Create the web application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Pages
        .route("/", get(dashboard_page))
        .route("/scan", get(scan_page).post(scan_submit))
        .route("/forecast", get(forecast_page))
        .route("/forecast/run", post(forecast_run))
        .route("/inventory", get(inventory_page))
        .route("/inventory/add", post(inventory_add))
        .route("/inventory/quantity", post(inventory_quantity))
        .route("/shopping-list", get(shopping_list_page))
        .route("/shopping-list/purchase", post(purchase_submit))
        // API endpoints
        .route("/api/inventory", get(api_get_inventory))
        .route("/api/shopping-list", get(api_get_shopping_list))
        .route("/api/catalog", get(api_get_catalog))
        .route("/api/stats", get(api_get_stats))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// === Flash messages (passed back through the query string) ===

#[derive(Deserialize)]
struct Flash {
    added: Option<usize>,
    updated: Option<usize>,
    purchased: Option<usize>,
    error: Option<String>,
}

impl Flash {
    fn banner(&self) -> String {
        if let Some(code) = self.error.as_deref() {
            let message = match code {
                "engine" => "Failed to reach the AI engine. Please try again.",
                "none" => "Could not identify any of the allowed items in the image.",
                "image" => "Please select an image file first.",
                "upload" => "Reading the uploaded image failed. Please try again.",
                "empty" => "Your inventory is empty. Please scan or add some items first.",
                _ => "Something went wrong.",
            };
            return format!(r#"<p class="banner banner-error">{}</p>"#, message);
        }
        if let Some(n) = self.added {
            return format!(
                r#"<p class="banner banner-ok">Scan complete: {} item type(s) added to your inventory.</p>"#,
                n
            );
        }
        if let Some(n) = self.updated {
            return format!(
                r#"<p class="banner banner-ok">Forecast updated {} item(s).</p>"#,
                n
            );
        }
        if let Some(n) = self.purchased {
            return format!(
                r#"<p class="banner banner-ok">Restocked {} item(s).</p>"#,
                n
            );
        }
        String::new()
    }
}

// === Page handlers ===

async fn dashboard_page(State(state): State<Arc<AppState>>) -> Html<String> {
    let inventory = state.inventory.read().await;
    let shopping_count = inventory.shopping_list().len();
    Html(render_dashboard(inventory.entries(), shopping_count))
}

async fn scan_page(Query(flash): Query<Flash>) -> Html<String> {
    Html(render_scan_page(&flash))
}

async fn forecast_page(
    State(state): State<Arc<AppState>>,
    Query(flash): Query<Flash>,
) -> Html<String> {
    let inventory = state.inventory.read().await;
    Html(render_forecast_page(inventory.entries(), &flash))
}

async fn inventory_page(
    State(state): State<Arc<AppState>>,
    Query(flash): Query<Flash>,
) -> Html<String> {
    let inventory = state.inventory.read().await;
    Html(render_inventory_page(inventory.entries(), &flash))
}

async fn shopping_list_page(
    State(state): State<Arc<AppState>>,
    Query(flash): Query<Flash>,
) -> Html<String> {
    let inventory = state.inventory.read().await;
    let items: Vec<Entry> = inventory.shopping_list().into_iter().cloned().collect();
    Html(render_shopping_list_page(&items, &flash))
}

// === Mutating form handlers ===

async fn scan_submit(State(state): State<Arc<AppState>>, mut multipart: Multipart) -> Redirect {
    let mut image: Option<Vec<u8>> = None;

    // A failed multipart read is not "no file selected"; report it as its
    // own error.
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                let name = field.name().map(str::to_string);
                if name.as_deref() == Some("image") {
                    match field.bytes().await {
                        Ok(bytes) if !bytes.is_empty() => image = Some(bytes.to_vec()),
                        Ok(_) => {}
                        Err(e) => {
                            error!("Reading upload failed: {}", e);
                            return Redirect::to("/scan?error=upload");
                        }
                    }
                }
            }
            Ok(None) => break,
            Err(e) => {
                error!("Reading upload failed: {}", e);
                return Redirect::to("/scan?error=upload");
            }
        }
    }

    let Some(image) = image else {
        return Redirect::to("/scan?error=image");
    };

    match recognize::identify_items(state.engine.as_ref(), &state.config, &image).await {
        Ok(patches) => {
            let count = patches.len();
            state.inventory.write().await.apply(&patches);
            info!("Scan applied {} patch(es)", count);
            Redirect::to(&format!("/scan?added={}", count))
        }
        Err(LarderError::NoItemsRecognized) => Redirect::to("/scan?error=none"),
        Err(e) => {
            error!("Scan failed: {}", e);
            Redirect::to("/scan?error=engine")
        }
    }
}

async fn forecast_run(State(state): State<Arc<AppState>>) -> Redirect {
    let names = state.inventory.read().await.names();
    if names.is_empty() {
        return Redirect::to("/forecast?error=empty");
    }

    match forecast::generate_forecast(state.engine.as_ref(), &state.config, &names).await {
        Ok(patches) => {
            let count = patches.len();
            state.inventory.write().await.apply(&patches);
            Redirect::to(&format!("/forecast?updated={}", count))
        }
        Err(e) => {
            error!("Forecast failed: {}", e);
            Redirect::to("/forecast?error=engine")
        }
    }
}

#[derive(Deserialize)]
struct AddForm {
    name: String,
}

async fn inventory_add(
    State(state): State<Arc<AppState>>,
    Form(form): Form<AddForm>,
) -> Redirect {
    // Off-catalog names are silently ignored, not an error.
    if let Ok(name) = ItemName::from_str(&form.name) {
        state.inventory.write().await.add(name);
    }
    Redirect::to("/inventory")
}

#[derive(Deserialize)]
struct QuantityForm {
    id: String,
    quantity: i64,
}

async fn inventory_quantity(
    State(state): State<Arc<AppState>>,
    Form(form): Form<QuantityForm>,
) -> Redirect {
    state
        .inventory
        .write()
        .await
        .set_quantity(&form.id, form.quantity);
    Redirect::to("/inventory")
}

#[derive(Deserialize)]
struct PurchaseForm {
    /// Comma-joined catalog names.
    names: String,
}

async fn purchase_submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<PurchaseForm>,
) -> Redirect {
    let names: Vec<ItemName> = form
        .names
        .split(',')
        .filter_map(|n| ItemName::from_str(n).ok())
        .collect();

    if names.is_empty() {
        return Redirect::to("/shopping-list");
    }

    let amount = state.config.rules.restock_amount;
    state.inventory.write().await.restock(&names, amount);
    Redirect::to(&format!("/shopping-list?purchased={}", names.len()))
}

// === API handlers ===

async fn api_get_inventory(State(state): State<Arc<AppState>>) -> Json<Vec<Entry>> {
    let inventory = state.inventory.read().await;
    Json(inventory.entries().to_vec())
}

async fn api_get_shopping_list(State(state): State<Arc<AppState>>) -> Json<Vec<Entry>> {
    let inventory = state.inventory.read().await;
    Json(inventory.shopping_list().into_iter().cloned().collect())
}

async fn api_get_catalog() -> Json<Vec<&'static str>> {
    Json(ItemName::ALL.iter().map(|i| i.as_str()).collect())
}

#[derive(Serialize)]
struct StatsResponse {
    tracked_items: usize,
    total_units: u64,
    in_stock: usize,
    low_stock: usize,
    out_of_stock: usize,
    shopping_list: usize,
}

async fn api_get_stats(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    let inventory = state.inventory.read().await;
    let entries = inventory.entries();

    let count_status =
        |status: StockStatus| entries.iter().filter(|e| e.status == status).count();

    Json(StatsResponse {
        tracked_items: entries.len(),
        total_units: entries.iter().map(|e| u64::from(e.quantity)).sum(),
        in_stock: count_status(StockStatus::InStock),
        low_stock: count_status(StockStatus::LowStock),
        out_of_stock: count_status(StockStatus::OutOfStock),
        shopping_list: inventory.shopping_list().len(),
    })
}

// === Template rendering ===

/// Escape model-supplied text before it lands in the page.
fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn base_template(title: &str, content: &str) -> String {
    format!(r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - Larder</title>
    <style>
        :root {{
            --bg-primary: #1a1a2e;
            --bg-secondary: #16213e;
            --bg-card: #0f3460;
            --text-primary: #e8e8e8;
            --text-secondary: #a0a0a0;
            --accent: #e94560;
            --accent-hover: #ff6b6b;
            --success: #00d9a5;
            --warning: #f0b429;
            --border: #2a2a4a;
        }}
        * {{ box-sizing: border-box; margin: 0; padding: 0; }}
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: var(--bg-primary);
            color: var(--text-primary);
            line-height: 1.6;
        }}
        .container {{ max-width: 1100px; margin: 0 auto; padding: 20px; }}
        nav {{
            background: var(--bg-secondary);
            padding: 15px 20px;
            display: flex;
            align-items: center;
            gap: 30px;
            border-bottom: 1px solid var(--border);
        }}
        nav .logo {{
            font-size: 1.5em;
            font-weight: bold;
            color: var(--accent);
            text-decoration: none;
        }}
        nav a {{
            color: var(--text-secondary);
            text-decoration: none;
            transition: color 0.2s;
        }}
        nav a:hover {{ color: var(--text-primary); }}
        .card {{
            background: var(--bg-card);
            border-radius: 12px;
            padding: 20px;
            margin-bottom: 20px;
        }}
        .card h2 {{
            margin-bottom: 15px;
            color: var(--accent);
        }}
        .stats-grid {{
            display: grid;
            grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
            gap: 20px;
            margin-bottom: 30px;
        }}
        .stat-card {{
            background: var(--bg-card);
            border-radius: 12px;
            padding: 20px;
            text-align: center;
        }}
        .stat-card .number {{
            font-size: 2.5em;
            font-weight: bold;
            color: var(--accent);
        }}
        .stat-card .label {{
            color: var(--text-secondary);
            font-size: 0.9em;
        }}
        table {{
            width: 100%;
            border-collapse: collapse;
        }}
        th, td {{
            padding: 12px;
            text-align: left;
            border-bottom: 1px solid var(--border);
        }}
        th {{ color: var(--text-secondary); font-weight: 500; }}
        tr:hover {{ background: rgba(255,255,255,0.05); }}
        .badge {{
            display: inline-block;
            padding: 2px 10px;
            border-radius: 12px;
            font-size: 0.8em;
            border: 1px solid var(--border);
        }}
        .badge-in {{ background: rgba(0,217,165,0.15); color: var(--success); }}
        .badge-low {{ background: rgba(240,180,41,0.15); color: var(--warning); }}
        .badge-out {{ background: rgba(233,69,96,0.15); color: var(--accent); }}
        .banner {{
            padding: 10px 14px;
            border-radius: 8px;
            margin-bottom: 15px;
        }}
        .banner-ok {{ background: rgba(0,217,165,0.15); color: var(--success); }}
        .banner-error {{ background: rgba(233,69,96,0.15); color: var(--accent); }}
        button, .button {{
            background: var(--accent);
            color: white;
            border: none;
            border-radius: 8px;
            padding: 8px 16px;
            cursor: pointer;
        }}
        button:hover {{ background: var(--accent-hover); }}
        button.small {{ padding: 2px 10px; }}
        select, input[type="file"] {{
            background: var(--bg-secondary);
            color: var(--text-primary);
            border: 1px solid var(--border);
            border-radius: 8px;
            padding: 8px;
        }}
        form.inline {{ display: inline; }}
        .muted {{ color: var(--text-secondary); }}
    </style>
</head>
<body>
    <nav>
        <a href="/" class="logo">Larder</a>
        <a href="/">Dashboard</a>
        <a href="/scan">Scan</a>
        <a href="/forecast">Forecast</a>
        <a href="/inventory">Inventory</a>
        <a href="/shopping-list">Shopping List</a>
    </nav>
    <main class="container">
        {}
    </main>
</body>
</html>"#, title, content)
}

fn status_badge(status: StockStatus) -> String {
    let class = match status {
        StockStatus::InStock => "badge-in",
        StockStatus::LowStock => "badge-low",
        StockStatus::OutOfStock => "badge-out",
    };
    format!(r#"<span class="badge {}">{}</span>"#, class, status)
}

fn render_entries_table(entries: &[Entry], with_controls: bool) -> String {
    if entries.is_empty() {
        return r#"<p class="muted">No items tracked yet. Scan a photo or add items manually.</p>"#
            .to_string();
    }

    let controls_header = if with_controls { "<th>Adjust</th>" } else { "" };

    let rows: String = entries
        .iter()
        .map(|e| {
            let controls = if with_controls {
                format!(
                    r#"
                    <td>
                        <form class="inline" method="post" action="/inventory/quantity">
                            <input type="hidden" name="id" value="{id}">
                            <input type="hidden" name="quantity" value="{dec}">
                            <button class="small" type="submit">-</button>
                        </form>
                        <form class="inline" method="post" action="/inventory/quantity">
                            <input type="hidden" name="id" value="{id}">
                            <input type="hidden" name="quantity" value="{inc}">
                            <button class="small" type="submit">+</button>
                        </form>
                    </td>"#,
                    id = e.id,
                    dec = i64::from(e.quantity) - 1,
                    inc = i64::from(e.quantity) + 1,
                )
            } else {
                String::new()
            };

            format!(
                r#"
                <tr>
                    <td>{}</td>
                    <td>{}</td>
                    <td>{}</td>
                    <td>{}</td>
                    <td>{}</td>
                    {}
                </tr>"#,
                e.name,
                e.quantity,
                status_badge(e.status),
                escape_html(&e.usage_rate),
                escape_html(&e.reorder_date),
                controls,
            )
        })
        .collect();

    format!(
        r#"
        <table>
            <tr>
                <th>Item</th>
                <th>Quantity</th>
                <th>Status</th>
                <th>Usage Rate</th>
                <th>Reorder By</th>
                {}
            </tr>
            {}
        </table>"#,
        controls_header, rows
    )
}

fn render_dashboard(entries: &[Entry], shopping_count: usize) -> String {
    let out_of_stock = entries
        .iter()
        .filter(|e| e.status == StockStatus::OutOfStock)
        .count();

    let content = format!(
        r#"
        <h1>Dashboard</h1>
        <div class="stats-grid">
            <div class="stat-card">
                <div class="number">{}</div>
                <div class="label">Tracked Items</div>
            </div>
            <div class="stat-card">
                <div class="number">{}</div>
                <div class="label">Shopping List</div>
            </div>
            <div class="stat-card">
                <div class="number">{}</div>
                <div class="label">Out of Stock</div>
            </div>
        </div>
        <div class="card">
            <h2>Inventory</h2>
            {}
        </div>"#,
        entries.len(),
        shopping_count,
        out_of_stock,
        render_entries_table(entries, false),
    );

    base_template("Dashboard", &content)
}

fn render_scan_page(flash: &Flash) -> String {
    let content = format!(
        r#"
        <h1>Inventory Vision Scanner</h1>
        <p class="muted">Upload a picture of your pantry or fridge to automatically update your inventory.</p>
        {}
        <div class="card">
            <form method="post" action="/scan" enctype="multipart/form-data">
                <input type="file" name="image" accept="image/*">
                <button type="submit">Scan Inventory</button>
            </form>
        </div>"#,
        flash.banner(),
    );

    base_template("Scan", &content)
}

fn render_forecast_page(entries: &[Entry], flash: &Flash) -> String {
    let content = format!(
        r#"
        <h1>Consumption Forecast</h1>
        <p class="muted">Let the AI predict your usage patterns and suggest when to reorder.</p>
        {}
        <div class="card">
            <form method="post" action="/forecast/run">
                <button type="submit">Generate Forecast</button>
            </form>
        </div>
        <div class="card">
            <h2>Forecast</h2>
            {}
        </div>"#,
        flash.banner(),
        render_entries_table(entries, false),
    );

    base_template("Forecast", &content)
}

fn render_inventory_page(entries: &[Entry], flash: &Flash) -> String {
    let tracked: Vec<ItemName> = entries.iter().map(|e| e.name).collect();
    let available: Vec<&'static str> = ItemName::ALL
        .iter()
        .filter(|n| !tracked.contains(n))
        .map(|n| n.as_str())
        .collect();

    let add_form = if available.is_empty() {
        r#"<p class="muted">All catalog items have been added.</p>"#.to_string()
    } else {
        let options: String = available
            .iter()
            .map(|name| format!(r#"<option value="{0}">{0}</option>"#, name))
            .collect();
        format!(
            r#"
            <form method="post" action="/inventory/add">
                <select name="name">{}</select>
                <button type="submit">Add Item</button>
            </form>"#,
            options
        )
    };

    let content = format!(
        r#"
        <h1>Inventory</h1>
        {}
        <div class="card">
            {}
        </div>
        <div class="card">
            <h2>Add Item</h2>
            {}
        </div>"#,
        flash.banner(),
        render_entries_table(entries, true),
        add_form,
    );

    base_template("Inventory", &content)
}

fn render_shopping_list_page(items: &[Entry], flash: &Flash) -> String {
    let body = if items.is_empty() {
        r#"
        <div class="card" style="text-align:center">
            <h2>All Caught Up!</h2>
            <p class="muted">Your shopping list is empty. Great job staying stocked!</p>
        </div>"#
            .to_string()
    } else {
        let rows: String = items
            .iter()
            .map(|e| {
                format!(
                    r#"
                    <tr>
                        <td>{name}</td>
                        <td>{badge}</td>
                        <td>
                            <form class="inline" method="post" action="/shopping-list/purchase">
                                <input type="hidden" name="names" value="{name}">
                                <button class="small" type="submit">Mark Purchased</button>
                            </form>
                        </td>
                    </tr>"#,
                    name = e.name,
                    badge = status_badge(e.status),
                )
            })
            .collect();

        let all_names: String = items
            .iter()
            .map(|e| e.name.as_str())
            .collect::<Vec<_>>()
            .join(",");

        format!(
            r#"
            <div class="card">
                <table>
                    <tr><th>Item</th><th>Status</th><th></th></tr>
                    {}
                </table>
            </div>
            <form method="post" action="/shopping-list/purchase">
                <input type="hidden" name="names" value="{}">
                <button type="submit">Purchase All</button>
            </form>"#,
            rows, all_names
        )
    };

    let content = format!(
        r#"
        <h1>Shopping List</h1>
        <p class="muted">Items that are low or out of stock.</p>
        {}
        {}"#,
        flash.banner(),
        body,
    );

    base_template("Shopping List", &content)
}

/// Start the web server
pub async fn start_server(state: Arc<AppState>) -> crate::Result<()> {
    let addr = format!("{}:{}", state.config.web.host, state.config.web.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Web UI available at http://{}", addr);

    let router = create_router(state);
    axum::serve(listener, router)
        .await
        .map_err(|e| crate::LarderError::Config(format!("Server error: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::EntryPatch;
    use crate::Result;
    use async_trait::async_trait;

    struct StubEngine;

    #[async_trait]
    impl Engine for StubEngine {
        async fn recognize(&self, _prompt: &str, _image_base64: &str) -> Result<String> {
            Ok(r#"[{"name": "Milk", "quantity": 2}]"#.to_string())
        }

        async fn forecast(&self, _prompt: &str) -> Result<String> {
            Ok(r#"[{"name": "Milk", "usageRate": "1 unit every 3 days", "reorderDate": "2025-09-05"}]"#.to_string())
        }
    }

    fn test_state() -> Arc<AppState> {
        Arc::new(AppState::new(AppConfig::default(), Arc::new(StubEngine)))
    }

    #[tokio::test]
    async fn test_add_form_ignores_unknown_names() {
        let state = test_state();

        inventory_add(
            State(state.clone()),
            Form(AddForm {
                name: "Detergent".to_string(),
            }),
        )
        .await;
        assert!(state.inventory.read().await.is_empty());

        inventory_add(
            State(state.clone()),
            Form(AddForm {
                name: "milk".to_string(),
            }),
        )
        .await;
        let inventory = state.inventory.read().await;
        assert_eq!(inventory.len(), 1);
        assert_eq!(inventory.entries()[0].quantity, 1);
    }

    #[tokio::test]
    async fn test_add_form_case_varied_name_overlays_existing_entry() {
        let state = test_state();
        state
            .inventory
            .write()
            .await
            .apply(&[EntryPatch::with_quantity(ItemName::Milk, 4)]);

        inventory_add(
            State(state.clone()),
            Form(AddForm {
                name: "MILK".to_string(),
            }),
        )
        .await;

        let inventory = state.inventory.read().await;
        assert_eq!(inventory.len(), 1, "no duplicate entry");
        let entry = &inventory.entries()[0];
        assert_eq!(entry.quantity, 1);
        assert_eq!(entry.status, StockStatus::LowStock);
    }

    #[tokio::test]
    async fn test_quantity_form_clamps_negative() {
        let state = test_state();
        state
            .inventory
            .write()
            .await
            .apply(&[EntryPatch::with_quantity(ItemName::Bread, 1)]);
        let id = state.inventory.read().await.entries()[0].id.clone();

        inventory_quantity(
            State(state.clone()),
            Form(QuantityForm { id, quantity: -2 }),
        )
        .await;

        assert_eq!(state.inventory.read().await.entries()[0].quantity, 0);
    }

    #[tokio::test]
    async fn test_purchase_restocks_named_entries() {
        let state = test_state();
        state.inventory.write().await.apply(&[
            EntryPatch::with_quantity(ItemName::Rice, 1),
            EntryPatch::with_quantity(ItemName::Milk, 0),
        ]);

        purchase_submit(
            State(state.clone()),
            Form(PurchaseForm {
                names: "Rice,Milk".to_string(),
            }),
        )
        .await;

        let inventory = state.inventory.read().await;
        let quantities: Vec<u32> = inventory.entries().iter().map(|e| e.quantity).collect();
        assert_eq!(quantities, vec![5, 6]); // Milk, Rice (sorted by name)
        assert!(inventory.shopping_list().is_empty());
    }

    #[tokio::test]
    async fn test_scan_truncated_upload_reports_upload_error() {
        let state = test_state();
        let app = create_router(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();

        // Body ends mid-field, with no closing boundary.
        let response = client
            .post(format!("http://{}/scan", addr))
            .header("content-type", "multipart/form-data; boundary=boundary")
            .body("--boundary\r\nContent-Disposition: form-data; name=\"image\"\r\n\r\nJFIF")
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), reqwest::StatusCode::SEE_OTHER);
        assert_eq!(
            response
                .headers()
                .get("location")
                .and_then(|v| v.to_str().ok()),
            Some("/scan?error=upload")
        );
        assert!(state.inventory.read().await.is_empty());

        server.abort();
    }

    #[tokio::test]
    async fn test_forecast_run_applies_annotations() {
        let state = test_state();
        state
            .inventory
            .write()
            .await
            .apply(&[EntryPatch::with_quantity(ItemName::Milk, 4)]);

        forecast_run(State(state.clone())).await;

        let inventory = state.inventory.read().await;
        let entry = &inventory.entries()[0];
        assert_eq!(entry.quantity, 4, "forecast leaves quantity alone");
        assert_eq!(entry.usage_rate, "1 unit every 3 days");
        assert_eq!(entry.reorder_date, "2025-09-05");
    }

    #[tokio::test]
    async fn test_forecast_run_with_empty_inventory_is_rejected() {
        let state = test_state();
        forecast_run(State(state.clone())).await;
        assert!(state.inventory.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_stats_reflect_inventory() {
        let state = test_state();
        state.inventory.write().await.apply(&[
            EntryPatch::with_quantity(ItemName::Rice, 5),
            EntryPatch::with_quantity(ItemName::Milk, 1),
            EntryPatch::with_quantity(ItemName::Bread, 0),
        ]);

        let Json(stats) = api_get_stats(State(state)).await;
        assert_eq!(stats.tracked_items, 3);
        assert_eq!(stats.total_units, 6);
        assert_eq!(stats.in_stock, 1);
        assert_eq!(stats.low_stock, 1);
        assert_eq!(stats.out_of_stock, 1);
        assert_eq!(stats.shopping_list, 2);
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"1 & 2"</b>"#),
            "&lt;b&gt;&quot;1 &amp; 2&quot;&lt;/b&gt;"
        );
    }
}
