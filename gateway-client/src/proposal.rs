use gateway_common::{ChaincodeProposal, TransactionId, TransientMap};

/// Assembles the chaincode invocation a transaction sends to peers.
///
/// The transient map is only attached when it holds at least one entry.
pub fn build_proposal(
    chaincode_id: &str,
    fcn: &str,
    tx_id: &TransactionId,
    args: Vec<String>,
    transient_map: Option<&TransientMap>,
) -> ChaincodeProposal {
    ChaincodeProposal {
        fcn: fcn.to_string(),
        tx_id: tx_id.as_str().to_string(),
        chaincode_id: chaincode_id.to_string(),
        args,
        transient_map: transient_map.filter(|map| !map.is_empty()).cloned(),
    }
}
