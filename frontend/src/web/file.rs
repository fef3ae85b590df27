//! 文件读写
//!
//! - 把下载结果保存为本地文件（Blob + object URL）
//! - 把 `<input type="file">` 选中的文件读成 `FilePart`

use js_sys::{Array, Uint8Array};
use taskhub_shared::protocol::FilePart;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, File, HtmlAnchorElement, HtmlInputElement, Url};

use crate::api::Download;

/// 触发浏览器下载
pub fn save(download: &Download) -> Result<(), JsValue> {
    let parts = Array::of1(&Uint8Array::from(download.bytes.as_slice()).into());
    let bag = BlobPropertyBag::new();
    bag.set_type(&download.content_type);
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &bag)?;
    let url = Url::create_object_url_with_blob(&blob)?;

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("无法获取 document 对象"))?;
    let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
    anchor.set_href(&url);
    anchor.set_download(&download.filename);
    anchor.click();

    Url::revoke_object_url(&url)
}

/// 取出文件输入框中的第一个文件
pub fn selected_file(input: &HtmlInputElement) -> Option<File> {
    input.files()?.get(0)
}

/// 读取文件内容
pub async fn read_file(file: &File) -> Result<FilePart, JsValue> {
    let buffer = JsFuture::from(file.array_buffer()).await?;
    let content_type = match file.type_() {
        t if t.is_empty() => "application/octet-stream".to_string(),
        t => t,
    };
    Ok(FilePart {
        filename: file.name(),
        content_type,
        bytes: Uint8Array::new(&buffer).to_vec(),
    })
}
