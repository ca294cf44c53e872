use anyhow::Context;
use image::RgbaImage;
use js_sys::Uint8Array;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

/// Fetch an image over HTTP and decode it to RGBA8.
pub async fn fetch_image(url: &str) -> anyhow::Result<RgbaImage> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let resp = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|e| anyhow::anyhow!("fetch {url}: {:?}", e))?;
    let resp: web::Response = resp
        .dyn_into()
        .map_err(|e| anyhow::anyhow!("fetch {url}: not a response: {:?}", e))?;
    if !resp.ok() {
        anyhow::bail!("fetch {url}: HTTP {}", resp.status());
    }
    let buf = resp
        .array_buffer()
        .map_err(|e| anyhow::anyhow!("read {url}: {:?}", e))?;
    let buf = JsFuture::from(buf)
        .await
        .map_err(|e| anyhow::anyhow!("read {url}: {:?}", e))?;
    let bytes = Uint8Array::new(&buf).to_vec();
    let img = image::load_from_memory(&bytes).with_context(|| format!("decode {url}"))?;
    Ok(img.to_rgba8())
}
