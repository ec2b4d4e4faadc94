use crate::config::Config;
use crate::contract::Contract;
use crate::event_handler::EventHub;
use crate::network::{Network, PeerInfo};
use crate::transport::{PeerEndpoint, TcpChannel, TcpEventHub};

use std::sync::Arc;

use anyhow::Result;
use gateway_network::Client as NetClient;
use log::{debug, trace};

/// A network connected over TCP as described by a [`Config`].
pub struct Client {
    pub network: Arc<Network>,
}

impl Client {
    pub fn new(config: Config) -> Result<Self> {
        trace!("new client with config: {:?}", config);
        let net_client = NetClient::new(config.request_retries);
        let endpoints = config
            .peers
            .iter()
            .map(|peer| PeerEndpoint {
                info: PeerInfo {
                    name: peer.name.clone(),
                    msp_id: peer.msp_id.clone(),
                },
                addr: peer.addr,
            })
            .collect();
        let event_hubs: Vec<Arc<dyn EventHub>> = config
            .peers
            .iter()
            .map(|peer| {
                Arc::new(TcpEventHub::new(
                    &peer.name,
                    &peer.msp_id,
                    peer.event_addr,
                    net_client.clone(),
                )) as Arc<dyn EventHub>
            })
            .collect();
        let channel = TcpChannel::new(
            &config.channel,
            endpoints,
            config.orderer_addr,
            net_client,
        );
        debug!(
            "channel {} with {} peers as {}",
            config.channel,
            config.peers.len(),
            config.msp_id
        );
        let network = Network::new(
            Arc::new(channel),
            config.identity(),
            event_hubs,
            config.network_options(),
        );
        Ok(Self {
            network: Arc::new(network),
        })
    }

    pub fn contract(&self, chaincode_id: &str, namespace: Option<&str>) -> Contract {
        match namespace {
            Some(namespace) => self.network.contract_with_namespace(chaincode_id, namespace),
            None => self.network.contract(chaincode_id),
        }
    }
}
