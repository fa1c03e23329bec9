// Switch page endpoints: device identity and port statistics.

use tracing::debug;

use crate::client::EasySmartClient;
use crate::error::Error;
use crate::page::{self, PortStatistics, SystemInfo};

const SYSTEM_INFO_PAGE: &str = "/SystemInfoRpm.htm";
const PORT_STATISTICS_PAGE: &str = "/PortStatisticsRpm.htm";

impl EasySmartClient {
    /// Get the switch identity strings.
    ///
    /// `GET /SystemInfoRpm.htm`
    pub async fn get_system_info(&self) -> Result<SystemInfo, Error> {
        debug!("fetching system info");
        let body = self.get_page(SYSTEM_INFO_PAGE).await?;
        page::parse_system_info(&body)
    }

    /// Get the raw per-port statistics table.
    ///
    /// `GET /PortStatisticsRpm.htm`
    ///
    /// Returns undecoded fields because the code tables belong to the
    /// domain layer.
    pub async fn get_port_statistics(&self) -> Result<PortStatistics, Error> {
        debug!("fetching port statistics");
        let body = self.get_page(PORT_STATISTICS_PAGE).await?;
        page::parse_port_statistics(&body)
    }
}
