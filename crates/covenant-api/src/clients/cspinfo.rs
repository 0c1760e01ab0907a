//! gRPC client for the CSP-info service.

use std::time::Duration;

use async_trait::async_trait;
use tonic::Code;
use tonic::transport::{Channel, Endpoint};

use covenant_core::{Error, ProvisioningId, Result};
use covenant_proto::v1::CreateCspInfoRequest;
use covenant_proto::v1::csp_info_service_client::CspInfoServiceClient;
use covenant_service::{Provisioner, ProvisioningReply, ProvisioningRequest, StatusCode};

const SERVICE: &str = "cspinfo";

/// Provisioner backed by the CSP-info gRPC service.
///
/// The channel connects lazily, so construction succeeds even while the
/// service is still starting.
#[derive(Debug, Clone)]
pub struct CspInfoClient {
    client: CspInfoServiceClient<Channel>,
}

impl CspInfoClient {
    /// Creates a client for `uri`, bounding each request by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if `uri` is not a valid endpoint.
    pub fn connect_lazy(uri: impl Into<String>, timeout: Duration) -> Result<Self> {
        let uri = uri.into();
        let endpoint = Endpoint::from_shared(uri.clone())
            .map_err(|e| Error::InvalidInput(format!("invalid CSP-info endpoint {uri}: {e}")))?
            .timeout(timeout)
            .connect_timeout(timeout);
        Ok(Self {
            client: CspInfoServiceClient::new(endpoint.connect_lazy()),
        })
    }
}

#[async_trait]
impl Provisioner for CspInfoClient {
    async fn create_provisioning_record(
        &self,
        request: ProvisioningRequest,
    ) -> Result<ProvisioningReply> {
        let mut client = self.client.clone();
        let response = match client
            .create_csp_info(CreateCspInfoRequest {
                contract_id: request.contract_id.to_string(),
                csp_name: request.csp_name,
                auth: request.auth,
            })
            .await
        {
            Ok(response) => response.into_inner(),
            Err(status) if is_transport_failure(status.code()) => {
                return Err(Error::downstream(
                    SERVICE,
                    format!("{:?}: {}", status.code(), status.message()),
                ));
            }
            Err(status) => {
                return Ok(ProvisioningReply::rejected(
                    StatusCode::from_i32(status.code() as i32),
                    status.message(),
                ));
            }
        };

        Ok(ProvisioningReply {
            status: StatusCode::from_i32(response.code),
            message: response.error.map(|e| e.msg).unwrap_or_default(),
            record_id: ProvisioningId::new(response.id),
        })
    }
}

/// Codes tonic produces when the call never reached a handler that answered.
///
/// Any other status was chosen by the service and is passed on as a rejection.
const fn is_transport_failure(code: Code) -> bool {
    matches!(
        code,
        Code::Unavailable | Code::DeadlineExceeded | Code::Cancelled | Code::Unknown
    )
}
