use anyhow::{Context, Result, bail};
use reqwest::{Client, StatusCode, header, redirect::Policy};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
struct Item {
    id: i32,
    name: String,
    completed: bool,
    completed_at: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Defaults assume the server is running locally on :3000
    let base = std::env::var("BASE_URL").unwrap_or_else(|_| "http://127.0.0.1:3000".to_string());

    // keep 303s visible instead of following them
    let http = Client::builder()
        .redirect(Policy::none())
        .build()
        .context("building http client failed")?;

    // 1) browser-style form post -> 303 with the created id
    submit_form(&http, &base, "Buy milk").await?;

    // 2) json create -> 201 with the item
    let dog = create_json(&http, &base, "Walk dog").await?;

    // 3) list, newest first
    call_get(&http, &format!("{base}/items")).await?;

    // 4) complete, then clear completed_at
    let done = update(
        &http,
        &format!("{base}/item/{}", dog.id),
        json!({ "completed": true, "completed_at": "2026-03-18 16:16:21" }),
    )
    .await?;
    println!(
        "Item {} '{}' completed={} at {:?}",
        done.id, done.name, done.completed, done.completed_at
    );
    update(
        &http,
        &format!("{base}/item/{}", dog.id),
        json!({ "completed_at": null }),
    )
    .await?;

    // 5) validation failure
    println!("\n==> POST {base}/item/store (empty name)");
    let resp = http
        .post(format!("{base}/item/store"))
        .header(header::ACCEPT, "application/json")
        .json(&json!({ "name": "" }))
        .send()
        .await
        .context("create request failed")?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await.context("reading body failed")?);

    // 6) delete twice: 200 then 404
    for _ in 0..2 {
        delete(&http, &format!("{base}/item/{}", dog.id)).await?;
    }

    Ok(())
}

async fn submit_form(http: &Client, base: &str, name: &str) -> Result<()> {
    println!("\n==> POST {base}/item/store (form)");

    let resp = http
        .post(format!("{base}/item/store"))
        .header(header::REFERER, format!("{base}/"))
        .form(&[("name", name)])
        .send()
        .await
        .context("form request failed")?;

    let status = resp.status();
    let location = resp
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
        .to_string();
    println!("Status: {status}");
    println!("Location: {location}");

    if status != StatusCode::SEE_OTHER {
        bail!("form submit failed with status {status}");
    }
    Ok(())
}

async fn create_json(http: &Client, base: &str, name: &str) -> Result<Item> {
    println!("\n==> POST {base}/item/store (json)");

    let resp = http
        .post(format!("{base}/item/store"))
        .header(header::ACCEPT, "application/json")
        .json(&json!({ "name": name }))
        .send()
        .await
        .context("create request failed")?;

    let status = resp.status();
    let text = resp.text().await.context("reading create body failed")?;
    println!("Status: {status}");
    println!("Body: {text}");

    if status != StatusCode::CREATED {
        bail!("create failed with status {status}");
    }
    serde_json::from_str(&text).context("parsing created item failed")
}

async fn update(http: &Client, url: &str, body: serde_json::Value) -> Result<Item> {
    println!("\n==> PUT {url}");

    let resp = http
        .put(url)
        .json(&body)
        .send()
        .await
        .context("update request failed")?;

    let status = resp.status();
    let text = resp.text().await.context("reading update body failed")?;
    println!("Status: {status}");
    println!("Body: {text}");

    if status != StatusCode::OK {
        bail!("update failed with status {status}");
    }
    serde_json::from_str(&text).context("parsing updated item failed")
}

async fn delete(http: &Client, url: &str) -> Result<()> {
    println!("\n==> DELETE {url}");

    let resp = http.delete(url).send().await.context("delete request failed")?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await.context("reading delete body failed")?);
    Ok(())
}

async fn call_get(http: &Client, url: &str) -> Result<()> {
    println!("\n==> GET {url}");

    let resp = http.get(url).send().await.context("GET request failed")?;
    let status = resp.status();
    let text = resp.text().await.context("reading GET body failed")?;

    println!("Status: {status}");
    println!("Body: {text}");
    Ok(())
}
