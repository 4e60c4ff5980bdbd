use std::sync::Arc;

use sqlx::SqlitePool;

use super::{
    channel::{ChannelVerifier, SimulatedChannel},
    config::Config,
    database::init_pool,
    gateway::{MockGateway, SmsGateway},
};

pub struct State {
    pub config: Config,
    pub pool: SqlitePool,
    pub channel: Arc<dyn ChannelVerifier>,
    pub gateway: Arc<dyn SmsGateway>,
}

impl State {
    pub async fn new() -> Arc<Self> {
        let config = Config::load();

        let pool = init_pool(&config.database_url).await;
        let channel = Arc::new(SimulatedChannel::new(config.channel_name.clone()));

        Arc::new(Self {
            config,
            pool,
            channel,
            gateway: Arc::new(MockGateway),
        })
    }
}
