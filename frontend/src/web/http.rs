//! Fetch 传输层
//!
//! 使用 `web_sys::fetch` 实现 `Transport`，通过 `AbortController` 实现请求超时。

use std::cell::Cell;
use std::rc::Rc;

use async_trait::async_trait;
use gloo_timers::callback::Timeout;
use js_sys::{Array, Uint8Array};
use taskhub_shared::protocol::FilePart;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, Blob, BlobPropertyBag, FormData, Headers, Request, RequestInit, Response};

use crate::api::{HttpRequest, HttpResponse, RequestBody, Transport};
use crate::error::{ApiError, ApiErrorKind, ApiResult};

fn build_error(what: &str, e: JsValue) -> ApiError {
    ApiError::new(ApiErrorKind::Encode, format!("{}: {:?}", what, e))
}

/// 构造 multipart 表单，浏览器自动生成 boundary
fn form_data(field: &str, file: &FilePart) -> Result<FormData, JsValue> {
    let parts = Array::of1(&Uint8Array::from(file.bytes.as_slice()).into());
    let bag = BlobPropertyBag::new();
    bag.set_type(&file.content_type);
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &bag)?;

    let form = FormData::new()?;
    form.append_with_blob_and_filename(field, &blob, &file.filename)?;
    Ok(form)
}

/// 浏览器 fetch 传输
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchTransport;

impl FetchTransport {
    fn build(req: &HttpRequest, controller: &AbortController) -> ApiResult<Request> {
        let headers = Headers::new().map_err(|e| build_error("创建 Headers 失败", e))?;
        for (key, value) in &req.headers {
            headers
                .set(key, value)
                .map_err(|e| build_error("设置 Header 失败", e))?;
        }

        let opts = RequestInit::new();
        opts.set_method(req.method.as_str());
        opts.set_headers(&headers.into());
        opts.set_signal(Some(&controller.signal()));

        match &req.body {
            RequestBody::Empty => {}
            RequestBody::Text(body) => opts.set_body(&JsValue::from_str(body)),
            RequestBody::Multipart { field, file } => {
                let form = form_data(field, file).map_err(|e| build_error("构造表单失败", e))?;
                opts.set_body(&form.into());
            }
        }

        Request::new_with_str_and_init(&req.url, &opts).map_err(|e| build_error("构造请求失败", e))
    }

    async fn read(response: Response) -> Result<HttpResponse, JsValue> {
        let headers = response.headers();
        let content_type = headers.get("content-type")?;
        let content_disposition = headers.get("content-disposition")?;

        let buffer = JsFuture::from(response.array_buffer()?).await?;
        Ok(HttpResponse {
            status: response.status(),
            content_type,
            content_disposition,
            body: Uint8Array::new(&buffer).to_vec(),
        })
    }
}

#[async_trait(?Send)]
impl Transport for FetchTransport {
    async fn send(&self, req: HttpRequest) -> ApiResult<HttpResponse> {
        let controller = AbortController::new().map_err(|e| build_error("创建 AbortController 失败", e))?;
        let request = Self::build(&req, &controller)?;

        let window = web_sys::window().ok_or_else(|| ApiError::network("无法获取 window 对象"))?;

        // 超时后中止请求，drop 时自动取消定时器
        let timed_out = Rc::new(Cell::new(false));
        let _timeout = {
            let timed_out = timed_out.clone();
            let controller = controller.clone();
            Timeout::new(req.timeout_ms, move || {
                timed_out.set(true);
                controller.abort();
            })
        };

        let fail = |e: JsValue| {
            if timed_out.get() {
                ApiError::timeout(req.timeout_ms)
            } else {
                ApiError::network(format!("{:?}", e))
            }
        };

        let value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(fail)?;
        let response: Response = value
            .dyn_into()
            .map_err(|e| ApiError::decode(format!("Response 类型转换失败: {:?}", e)))?;

        Self::read(response).await.map_err(fail)
    }
}
