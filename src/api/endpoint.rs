pub type Endpoint = str;

pub const PANELS: &Endpoint = "/api/solarpanel";
pub const MEASUREMENTS: &Endpoint = "/api/solarpanel/measure";
pub const PERFORMANCE: &Endpoint = "/api/solarpanel/performance";
pub const ALERTS: &Endpoint = "/api/alerts";
pub const NEW_ALERT: &Endpoint = "/api/newAlert";
