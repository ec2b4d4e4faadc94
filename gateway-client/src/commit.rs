use crate::error::{Error, Result};
use crate::network::Channel;
use gateway_common::{ChaincodeProposal, CommitRequest, ProposalHeader, ProposalResponse};

use log::{debug, error};

/// Sends endorsed responses to the ordering service.
///
/// Only valid endorsements may be passed in; the request carries exactly
/// those. Any acknowledgement other than success fails with its status.
pub async fn send_to_orderer(
    channel: &dyn Channel,
    proposal: ChaincodeProposal,
    header: ProposalHeader,
    responses: Vec<ProposalResponse>,
) -> Result<()> {
    let tx_id = proposal.tx_id.clone();
    let request = CommitRequest {
        proposal,
        header,
        responses,
    };
    debug!(
        "sending {} endorsements of {} to orderer",
        request.responses.len(),
        tx_id
    );
    let ack = channel
        .send_to_orderer(request)
        .await
        .map_err(Error::Transport)?;
    if !ack.is_success() {
        error!(
            "orderer refused {}: {} {}",
            tx_id,
            ack.status,
            ack.info.as_deref().unwrap_or_default()
        );
        return Err(Error::OrderingService {
            tx_id,
            status: ack.status,
        });
    }
    Ok(())
}
