//! Event and flow field tables

use serde::Serialize;

use super::FieldEntry;
use crate::query::Table;

const EVENT_FIELDS: &[FieldEntry] = &[
    // Core identification
    FieldEntry::field("qid", "INTEGER", "QRadar event ID (use with QIDNAME function)"),
    FieldEntry::field("qidEventId", "INTEGER", "Original event ID from the log source"),
    FieldEntry::field("category", "INTEGER", "Low-level category ID (use with CATEGORYNAME)"),
    FieldEntry::field("logsourceid", "INTEGER", "Log source ID (use with LOGSOURCENAME)"),
    FieldEntry::field("devicetype", "INTEGER", "Device type ID (use with LOGSOURCETYPENAME)"),
    // Network
    FieldEntry::field("sourceip", "IP", "Source IP address"),
    FieldEntry::field("destinationip", "IP", "Destination IP address"),
    FieldEntry::field("sourceport", "INTEGER", "Source port number"),
    FieldEntry::field("destinationport", "INTEGER", "Destination port number"),
    FieldEntry::field("sourcemac", "STRING", "Source MAC address"),
    FieldEntry::field("destinationmac", "STRING", "Destination MAC address"),
    FieldEntry::field("protocolid", "INTEGER", "Protocol ID (use with PROTOCOLNAME)"),
    // User and identity
    FieldEntry::field("username", "STRING", "Username associated with the event"),
    FieldEntry::field("identityip", "IP", "Identity IP address"),
    FieldEntry::field("identityhostname", "STRING", "Identity hostname"),
    // Time
    FieldEntry::field("starttime", "TIMESTAMP", "Event start time (milliseconds since epoch)"),
    FieldEntry::field("endtime", "TIMESTAMP", "Event end time"),
    FieldEntry::field("devicetime", "TIMESTAMP", "Time reported by the device"),
    // Event metadata
    FieldEntry::field("eventcount", "INTEGER", "Number of events aggregated"),
    FieldEntry::field("magnitude", "INTEGER", "Event magnitude (1-10)"),
    FieldEntry::field("severity", "INTEGER", "Event severity (1-10)"),
    FieldEntry::field("credibility", "INTEGER", "Event credibility (1-10)"),
    FieldEntry::field("relevance", "INTEGER", "Event relevance (1-10)"),
    // Payload
    FieldEntry::field("payload", "BLOB", "Raw event payload (use UTF8 function to read)"),
    FieldEntry::field("utf8payload", "STRING", "UTF-8 decoded payload"),
    // IPv6 and geography
    FieldEntry::field("sourcev6", "IPv6", "Source IPv6 address"),
    FieldEntry::field("destinationv6", "IPv6", "Destination IPv6 address"),
    FieldEntry::field("sourcegeographiclocation", "STRING", "Source geographic location"),
    FieldEntry::field("destinationgeographiclocation", "STRING", "Destination geographic location"),
    // Processing
    FieldEntry::field("processorid", "INTEGER", "Event processor ID"),
    FieldEntry::field("collectorid", "INTEGER", "Event collector ID"),
    FieldEntry::field("domainid", "INTEGER", "Domain ID"),
    // Rule and offense
    FieldEntry::field("ruleid", "INTEGER", "Rule ID that triggered"),
    FieldEntry::field("hasoffense", "BOOLEAN", "Whether event is part of an offense"),
];

const FLOW_FIELDS: &[FieldEntry] = &[
    // Traffic volume
    FieldEntry::field("sourcebytes", "LONG", "Bytes sent from source"),
    FieldEntry::field("destinationbytes", "LONG", "Bytes sent to destination"),
    FieldEntry::field("sourcepackets", "LONG", "Packets from source"),
    FieldEntry::field("destinationpackets", "LONG", "Packets to destination"),
    FieldEntry::field("totalbytes", "LONG", "Total bytes transferred"),
    FieldEntry::field("totalpackets", "LONG", "Total packets transferred"),
    // Network
    FieldEntry::field("sourceip", "IP", "Source IP address"),
    FieldEntry::field("destinationip", "IP", "Destination IP address"),
    FieldEntry::field("sourceport", "INTEGER", "Source port number"),
    FieldEntry::field("destinationport", "INTEGER", "Destination port number"),
    FieldEntry::field("protocolid", "INTEGER", "Protocol ID"),
    // Application
    FieldEntry::field("applicationid", "INTEGER", "Application ID (use with APPLICATIONNAME)"),
    FieldEntry::field("applicationname", "STRING", "Application name"),
    // ASN
    FieldEntry::field("sourceasn", "INTEGER", "Source Autonomous System Number"),
    FieldEntry::field("destinationasn", "INTEGER", "Destination Autonomous System Number"),
    // Payload
    FieldEntry::field("sourcepayload", "BLOB", "Source payload data"),
    FieldEntry::field("destinationpayload", "BLOB", "Destination payload data"),
    // Time
    FieldEntry::field("starttime", "TIMESTAMP", "Flow start time"),
    FieldEntry::field("endtime", "TIMESTAMP", "Flow end time"),
    FieldEntry::field("firstpackettime", "TIMESTAMP", "Time of first packet"),
    FieldEntry::field("lastpackettime", "TIMESTAMP", "Time of last packet"),
    // Geography
    FieldEntry::field("sourcegeographiclocation", "STRING", "Source geographic location"),
    FieldEntry::field("destinationgeographiclocation", "STRING", "Destination geographic location"),
    // Processing
    FieldEntry::field("flowdirection", "STRING", "Flow direction (L2L, L2R, R2L, R2R)"),
    FieldEntry::field("flowsourceid", "INTEGER", "Flow source ID"),
    FieldEntry::field("processorid", "INTEGER", "Processor ID"),
    FieldEntry::field("domainid", "INTEGER", "Domain ID"),
];

/// Named group of fields for reference screens
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldGroup {
    pub name: &'static str,
    pub fields: &'static [&'static str],
}

const EVENT_GROUPS: &[FieldGroup] = &[
    FieldGroup {
        name: "Network",
        fields: &[
            "sourceip", "destinationip", "sourceport", "destinationport", "sourcemac",
            "destinationmac", "protocolid", "sourcev6", "destinationv6",
        ],
    },
    FieldGroup {
        name: "Identity",
        fields: &["username", "identityip", "identityhostname"],
    },
    FieldGroup {
        name: "Time",
        fields: &["starttime", "endtime", "devicetime"],
    },
    FieldGroup {
        name: "Event Info",
        fields: &[
            "qid", "qidEventId", "category", "logsourceid", "devicetype", "eventcount",
            "magnitude", "severity", "credibility", "relevance",
        ],
    },
    FieldGroup {
        name: "Payload",
        fields: &["payload", "utf8payload"],
    },
    FieldGroup {
        name: "Geographic",
        fields: &["sourcegeographiclocation", "destinationgeographiclocation"],
    },
    FieldGroup {
        name: "Processing",
        fields: &["processorid", "collectorid", "domainid", "ruleid", "hasoffense"],
    },
];

const FLOW_GROUPS: &[FieldGroup] = &[
    FieldGroup {
        name: "Traffic Volume",
        fields: &[
            "sourcebytes", "destinationbytes", "sourcepackets", "destinationpackets",
            "totalbytes", "totalpackets",
        ],
    },
    FieldGroup {
        name: "Network",
        fields: &["sourceip", "destinationip", "sourceport", "destinationport", "protocolid"],
    },
    FieldGroup {
        name: "Application",
        fields: &["applicationid", "applicationname"],
    },
    FieldGroup {
        name: "ASN",
        fields: &["sourceasn", "destinationasn"],
    },
    FieldGroup {
        name: "Payload",
        fields: &["sourcepayload", "destinationpayload"],
    },
    FieldGroup {
        name: "Time",
        fields: &["starttime", "endtime", "firstpackettime", "lastpackettime"],
    },
    FieldGroup {
        name: "Geographic",
        fields: &["sourcegeographiclocation", "destinationgeographiclocation"],
    },
    FieldGroup {
        name: "Processing",
        fields: &["flowdirection", "flowsourceid", "processorid", "domainid"],
    },
];

/// Fields of `table`, in reference order
pub fn list_fields(table: Table) -> &'static [FieldEntry] {
    match table {
        Table::Events => EVENT_FIELDS,
        Table::Flows => FLOW_FIELDS,
    }
}

/// Display groups of `table`'s fields
pub fn field_groups(table: Table) -> &'static [FieldGroup] {
    match table {
        Table::Events => EVENT_GROUPS,
        Table::Flows => FLOW_GROUPS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_field_counts() {
        assert_eq!(list_fields(Table::Events).len(), 34);
        assert_eq!(list_fields(Table::Flows).len(), 27);
    }

    #[test]
    fn test_field_names_unique_per_table() {
        for table in Table::ALL {
            let names: HashSet<_> = list_fields(table).iter().map(|f| f.name).collect();
            assert_eq!(names.len(), list_fields(table).len(), "duplicate in {}", table);
        }
    }

    #[test]
    fn test_groups_reference_existing_fields() {
        for table in Table::ALL {
            let names: HashSet<_> = list_fields(table).iter().map(|f| f.name).collect();
            for group in field_groups(table) {
                for field in group.fields {
                    assert!(names.contains(field), "{} missing from {}", field, table);
                }
            }
        }
    }

    #[test]
    fn test_fields_have_types() {
        assert!(list_fields(Table::Events)
            .iter()
            .all(|f| f.data_type.is_some()));
    }
}
