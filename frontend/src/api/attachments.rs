use taskhub_shared::protocol::{DeleteAttachment, DownloadAttachment, FilePart, UploadAttachment};
use taskhub_shared::Attachment;

use super::{ApiClient, Download, Transport};
use crate::auth::CredentialStore;
use crate::error::ApiResult;

impl<T: Transport, C: CredentialStore> ApiClient<T, C> {
    /// multipart 上传，字段名为 `file`
    pub async fn upload_attachment(&self, task_id: i64, file: FilePart) -> ApiResult<Attachment> {
        self.send(&UploadAttachment { task_id, file }).await
    }

    /// 后端未给出文件名时使用附件记录中的名称
    pub async fn download_attachment(&self, attachment: &Attachment) -> ApiResult<Download> {
        self.download(
            &DownloadAttachment {
                task_id: attachment.task_id,
                attachment_id: attachment.id,
            },
            &attachment.filename,
        )
        .await
    }

    pub async fn delete_attachment(&self, task_id: i64, attachment_id: i64) -> ApiResult<bool> {
        self.send(&DeleteAttachment {
            task_id,
            attachment_id,
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use crate::api::RequestBody;
    use crate::api::mock::mock_client;
    use serde_json::json;
    use taskhub_shared::protocol::{FilePart, HttpMethod};

    fn file() -> FilePart {
        FilePart {
            filename: "notes.txt".into(),
            content_type: "text/plain".into(),
            bytes: b"hello".to_vec(),
        }
    }

    #[tokio::test]
    async fn upload_is_multipart_without_a_content_type() {
        let (transport, api) = mock_client();
        transport.mock_json(
            HttpMethod::Post,
            "/api/tasks/3/attachments",
            200,
            json!({"id": 11, "task_id": 3, "filename": "notes.txt", "file_path": "uploads/x", "size": 5}),
        );

        let attachment = api.upload_attachment(3, file()).await.unwrap();

        assert_eq!(attachment.size, Some(5));
        let req = transport.last_request().unwrap();
        assert_eq!(req.header("Content-Type"), None);
        assert_eq!(req.header("Authorization"), Some("Bearer test-token"));
        assert_eq!(
            req.body,
            RequestBody::Multipart {
                field: "file",
                file: file(),
            }
        );
    }

    #[tokio::test]
    async fn download_falls_back_to_the_attachment_name() {
        let (transport, api) = mock_client();
        transport.mock_raw(
            HttpMethod::Get,
            "/api/tasks/3/attachments/11",
            200,
            b"hello".to_vec(),
            None,
        );
        let attachment = serde_json::from_value(
            json!({"id": 11, "task_id": 3, "filename": "notes.txt", "file_path": "uploads/x"}),
        )
        .unwrap();

        let download = api.download_attachment(&attachment).await.unwrap();

        assert_eq!(download.filename, "notes.txt");
        assert_eq!(download.content_type, "application/octet-stream");
        assert_eq!(download.bytes, b"hello".to_vec());
    }

    #[tokio::test]
    async fn delete_by_task_and_id() {
        let (transport, api) = mock_client();
        transport.mock_json(HttpMethod::Delete, "/api/tasks/3/attachments/11", 200, json!(true));

        assert!(api.delete_attachment(3, 11).await.unwrap());
        assert_eq!(transport.calls(), ["DELETE /api/tasks/3/attachments/11"]);
    }
}
