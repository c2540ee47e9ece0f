use aws_config::Region as AwsRegion;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::info;

use crate::config::Config;
use crate::errors::AppError;

/// Profile-photo blob storage on an S3-compatible object store.
#[derive(Clone)]
pub struct PhotoStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    endpoint: String,
}

impl PhotoStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: String, endpoint: String) -> PhotoStore {
        PhotoStore {
            client,
            bucket,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }

    /// Uploads the photo under a per-user key and returns its download URL.
    /// Re-uploading overwrites the previous photo at the same key.
    pub async fn upload_profile_photo(
        &self,
        user_id: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<String, AppError> {
        let key = format!("profiles/{user_id}/photo");
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("photo upload failed: {e}")))?;

        info!("uploaded profile photo to s3://{}/{}", self.bucket, key);
        Ok(self.object_url(&key))
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.endpoint, self.bucket, key)
    }
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
pub async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "lifeline-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(AwsRegion::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}
