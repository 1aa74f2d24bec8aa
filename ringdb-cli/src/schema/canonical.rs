//! Canonical sheet and column names

/// Sheet names on input and output workbooks
pub mod sheets {
    pub const SITE_LIST: &str = "Site List";
    pub const LENGTH: &str = "Length";
    pub const NEW_RING: &str = "New Ring";
    pub const INSERT_RING: &str = "Insert Ring";
    pub const DEL_SEGMENT: &str = "Del Segment";
    pub const SUMMARY: &str = "Summary";
    pub const DROP_SITE: &str = "Drop Site";
    pub const NOT_FOUND: &str = "Not Found Rings";
}

/// Site List columns
pub mod site {
    pub const SITE_ID: &str = "Site ID";
    pub const SITE_ID_IOH: &str = "Site ID IOH";
    pub const SITE_NAME: &str = "Site Name";
    pub const PROGRAM_NAME: &str = "Program Name";
    pub const PROGRAM_RING: &str = "Program Ring";
    pub const PROGRAM_STATUS: &str = "Program Status";
    pub const RING_KIND: &str = "insert/new ring";
    pub const SOW: &str = "SoW";
    pub const SITE_OWNER: &str = "Site Owner";
    pub const INITIAL_SITE_ID: &str = "Initial Site ID";
    pub const INITIAL_SITE_NAME: &str = "Initial Site Name";
    pub const LONG: &str = "Long";
    pub const LAT: &str = "Lat";
    pub const DATE_UPDATED: &str = "date_updated";
    pub const DATE_DROPPED: &str = "date_dropped";
    pub const NO: &str = "No";

    /// Columns always inherited from a prior listing of the site
    pub const INHERITED: [&str; 4] = [SOW, SITE_OWNER, INITIAL_SITE_ID, INITIAL_SITE_NAME];
}

/// New Ring / Insert Ring columns
pub mod ring {
    pub const RING_ID: &str = "Ring ID";
    pub const ORIGIN: &str = "Origin Site ID";
    pub const DESTINATION: &str = "Destination";
    pub const ORIGIN_NAME: &str = "Origin_Name";
    pub const DESTINATION_NAME: &str = "Destination_Name";
    pub const LINK_NAME: &str = "Link Name";
    pub const TOTAL_DISTANCE: &str = "Total Distance (m)";
    pub const EXISTING_CABLE: &str = "Existing Cable (m)";
    pub const NEW_CABLE: &str = "New Cable (m)";
    pub const VENDOR: &str = "Vendor";
    pub const PRIORITY_1: &str = "Priority_1";
    pub const PRIORITY_2: &str = "Priority_2";
    pub const LONG_1: &str = "Long_1";
    pub const LAT_1: &str = "Lat_1";
    pub const LONG_2: &str = "Long_2";
    pub const LAT_2: &str = "Lat_2";
    pub const SITE_STATUS_1: &str = "Existing/New Site_1";
    pub const SITE_STATUS_2: &str = "Existing/New Site_2";
    pub const RING_STATUS: &str = "Ring Status";
    pub const PROGRAM: &str = "Program";
    pub const PROGRAM_RING: &str = "Program Ring";
    pub const DATE_UPDATED: &str = "date_updated";
    pub const NO: &str = "No";
}

/// Length (ring summary) columns
pub mod length {
    pub const RING_ID: &str = "Ring ID";
    pub const SEGMENTS: &str = "#of Site";
    pub const FO_DISTANCE: &str = "FO Distance (Meter)";
    pub const AVG_LENGTH: &str = "AVG Length";
    pub const VENDOR: &str = "Vendor";
    pub const RING_STATUS: &str = "Ring Status";
    pub const DATE_UPDATED: &str = "date_updated";
    pub const NO: &str = "No";
}

/// Ring-list (insertion test) columns
pub mod ring_list {
    pub const RING_ID: &str = "Ring ID";
    pub const SITE_ID: &str = "Site ID";
    pub const NEAR_END: &str = "Near End";
    pub const FAR_END: &str = "Far End";
}

/// Tag values, compared in normalised form (lower-case, no spaces)
pub mod tags {
    pub const NEW_SITE: &str = "newsite";
    pub const INSERT_SITE: &str = "insertsite";
}

/// Display values written into synthesized rows
pub mod labels {
    pub const ACCESS: &str = "Access";
    pub const INSERT_SITE: &str = "Insert Site";
    pub const NEW_SITE: &str = "New Site";
    pub const NEW_RING: &str = "new ring";
    pub const INSERT_RING: &str = "insert ring";
}
