//! Built-in query templates

use super::TemplateEntry;

pub(super) const AUTHENTICATION: &str = "Authentication & Access";
pub(super) const NETWORK: &str = "Network & Traffic";
pub(super) const THREAT: &str = "Threat Detection";
pub(super) const SYSTEM: &str = "System Monitoring";
pub(super) const WINDOWS: &str = "Windows Events";
pub(super) const INVESTIGATION: &str = "Investigation Queries";

/// Category names in display order
pub(super) const CATEGORY_NAMES: [&str; 6] =
    [AUTHENTICATION, NETWORK, THREAT, SYSTEM, WINDOWS, INVESTIGATION];

pub(super) const TEMPLATES: &[TemplateEntry] = &[
    // Authentication & Access
    TemplateEntry {
        name: "Failed Login Attempts",
        category: AUTHENTICATION,
        description: "Find failed authentication attempts",
        query: "SELECT sourceip, username, COUNT(*) as attempts,
LOGSOURCENAME(logsourceid) as logsource
FROM events
WHERE QIDNAME(qid) ILIKE '%fail%login%'
   OR QIDNAME(qid) ILIKE '%authentication%fail%'
GROUP BY sourceip, username
ORDER BY attempts DESC
LIMIT 100
LAST 24 HOURS",
        params: &["time_range"],
    },
    TemplateEntry {
        name: "Successful Logins from Multiple IPs",
        category: AUTHENTICATION,
        description: "Users logging in from multiple source IPs",
        query: "SELECT username, UNIQUECOUNT(sourceip) as unique_ips,
COUNT(*) as login_count
FROM events
WHERE QIDNAME(qid) ILIKE '%success%login%'
  AND username IS NOT NULL
GROUP BY username
HAVING unique_ips > 3
ORDER BY unique_ips DESC
LAST 7 DAYS",
        params: &["threshold", "time_range"],
    },
    TemplateEntry {
        name: "After Hours Authentication",
        category: AUTHENTICATION,
        description: "Login events outside business hours (customize hours)",
        query: "SELECT DATEFORMAT(starttime, 'yyyy-MM-dd HH:mm') as time,
sourceip, username, QIDNAME(qid) as event
FROM events
WHERE (QIDNAME(qid) ILIKE '%login%' OR QIDNAME(qid) ILIKE '%authentication%')
  AND username IS NOT NULL
ORDER BY starttime DESC
LAST 24 HOURS",
        params: &["time_range"],
    },
    TemplateEntry {
        name: "Privileged Account Activity",
        category: AUTHENTICATION,
        description: "Activity by admin/root accounts",
        query: "SELECT DATEFORMAT(starttime, 'yyyy-MM-dd HH:mm') as time,
sourceip, username, QIDNAME(qid) as event,
LOGSOURCENAME(logsourceid) as source
FROM events
WHERE username ILIKE '%admin%'
   OR username ILIKE '%root%'
   OR username ILIKE '%administrator%'
ORDER BY starttime DESC
LIMIT 500
LAST 24 HOURS",
        params: &["username_pattern", "time_range"],
    },
    // Network & Traffic
    TemplateEntry {
        name: "Top Talkers by Bytes",
        category: NETWORK,
        description: "Find hosts generating most network traffic",
        query: "SELECT sourceip,
SUM(sourcebytes + destinationbytes) as total_bytes,
SUM(sourcepackets + destinationpackets) as total_packets,
UNIQUECOUNT(destinationip) as unique_destinations
FROM flows
GROUP BY sourceip
ORDER BY total_bytes DESC
LIMIT 50
LAST 24 HOURS",
        params: &["time_range"],
    },
    TemplateEntry {
        name: "External RDP Connections",
        category: NETWORK,
        description: "RDP (port 3389) connections from external IPs",
        query: "SELECT sourceip, destinationip,
DATEFORMAT(starttime, 'yyyy-MM-dd HH:mm') as time,
SUM(sourcebytes) as bytes
FROM flows
WHERE destinationport = 3389
  AND NOT INCIDR('10.0.0.0/8', sourceip)
  AND NOT INCIDR('172.16.0.0/12', sourceip)
  AND NOT INCIDR('192.168.0.0/16', sourceip)
GROUP BY sourceip, destinationip
ORDER BY bytes DESC
LAST 24 HOURS",
        params: &["port", "time_range"],
    },
    TemplateEntry {
        name: "SSH Connections",
        category: NETWORK,
        description: "All SSH (port 22) connections",
        query: "SELECT sourceip, destinationip,
COUNT(*) as connections,
SUM(sourcebytes) as total_bytes
FROM flows
WHERE destinationport = 22
GROUP BY sourceip, destinationip
ORDER BY connections DESC
LIMIT 100
LAST 24 HOURS",
        params: &["time_range"],
    },
    TemplateEntry {
        name: "Suspicious Port Activity",
        category: NETWORK,
        description: "Traffic on commonly exploited ports",
        query: "SELECT destinationport, sourceip, destinationip,
COUNT(*) as connections
FROM flows
WHERE destinationport IN (4444, 5555, 6666, 1337, 31337, 8080, 8443)
GROUP BY destinationport, sourceip, destinationip
ORDER BY connections DESC
LAST 7 DAYS",
        params: &["ports", "time_range"],
    },
    TemplateEntry {
        name: "Large Data Transfers",
        category: NETWORK,
        description: "Connections with high data volume (potential exfiltration)",
        query: "SELECT sourceip, destinationip, destinationport,
SUM(sourcebytes) as bytes_out,
SUM(destinationbytes) as bytes_in
FROM flows
WHERE sourcebytes > 100000000
GROUP BY sourceip, destinationip, destinationport
ORDER BY bytes_out DESC
LAST 24 HOURS",
        params: &["byte_threshold", "time_range"],
    },
    // Threat Detection
    TemplateEntry {
        name: "High Magnitude Events",
        category: THREAT,
        description: "Events with high magnitude score",
        query: "SELECT DATEFORMAT(starttime, 'yyyy-MM-dd HH:mm') as time,
sourceip, destinationip, username,
QIDNAME(qid) as event_name,
magnitude, severity, credibility,
LOGSOURCENAME(logsourceid) as source
FROM events
WHERE magnitude >= 7
ORDER BY magnitude DESC, starttime DESC
LIMIT 500
LAST 24 HOURS",
        params: &["magnitude_threshold", "time_range"],
    },
    TemplateEntry {
        name: "Potential Brute Force",
        category: THREAT,
        description: "Many failed attempts followed by success from same IP",
        query: "SELECT sourceip, destinationip, username,
COUNT(*) as total_events,
LOGSOURCENAME(logsourceid) as source
FROM events
WHERE QIDNAME(qid) ILIKE '%fail%'
   OR QIDNAME(qid) ILIKE '%denied%'
GROUP BY sourceip, destinationip, username
HAVING total_events > 50
ORDER BY total_events DESC
LAST 1 HOURS",
        params: &["threshold", "time_range"],
    },
    TemplateEntry {
        name: "Living off the Land Binaries (LOLBins)",
        category: THREAT,
        description: "Detection of suspicious Windows binary execution",
        query: r"SELECT sourceip, destinationip,
UTF8(payload) as command
FROM events
WHERE UTF8(payload) IMATCHES '.*(certutil|bitsadmin|mshta|regsvr32|rundll32|wmic|powershell|cmd)\.exe.*'
  AND LOGSOURCETYPENAME(devicetype) ILIKE '%Windows%'
GROUP BY sourceip
LAST 24 HOURS",
        params: &["time_range"],
    },
    TemplateEntry {
        name: "Potential DNS Tunneling",
        category: THREAT,
        description: "Unusually long DNS queries (potential data exfiltration)",
        query: "SELECT sourceip, destinationip,
COUNT(*) as query_count,
AVG(STRLEN(UTF8(payload))) as avg_query_length
FROM events
WHERE LOGSOURCETYPENAME(devicetype) ILIKE '%DNS%'
  AND STRLEN(UTF8(payload)) > 100
GROUP BY sourceip, destinationip
HAVING query_count > 100
ORDER BY avg_query_length DESC
LAST 24 HOURS",
        params: &["length_threshold", "time_range"],
    },
    TemplateEntry {
        name: "Port Scan Detection",
        category: THREAT,
        description: "Single source connecting to many ports",
        query: "SELECT sourceip, destinationip,
UNIQUECOUNT(destinationport) as unique_ports,
COUNT(*) as connection_attempts
FROM flows
GROUP BY sourceip, destinationip
HAVING unique_ports > 20
ORDER BY unique_ports DESC
LAST 1 HOURS",
        params: &["port_threshold", "time_range"],
    },
    // System Monitoring
    TemplateEntry {
        name: "Events by Log Source",
        category: SYSTEM,
        description: "Count events per log source",
        query: "SELECT LOGSOURCENAME(logsourceid) as log_source,
LOGSOURCETYPENAME(devicetype) as log_type,
COUNT(*) as event_count
FROM events
GROUP BY logsourceid, devicetype
ORDER BY event_count DESC
LIMIT 50
LAST 24 HOURS",
        params: &["time_range"],
    },
    TemplateEntry {
        name: "Events by Category",
        category: SYSTEM,
        description: "Event distribution by category",
        query: "SELECT CATEGORYNAME(category) as category,
COUNT(*) as event_count,
UNIQUECOUNT(sourceip) as unique_sources
FROM events
GROUP BY category
ORDER BY event_count DESC
LIMIT 50
LAST 24 HOURS",
        params: &["time_range"],
    },
    TemplateEntry {
        name: "Payload Size Analysis",
        category: SYSTEM,
        description: "Analyze payload sizes by log source",
        query: "SELECT LOGSOURCETYPENAME(devicetype) AS log_source,
MIN(STRLEN(UTF8(payload))) AS min_size,
MAX(STRLEN(UTF8(payload))) AS max_size,
AVG(STRLEN(UTF8(payload))) AS avg_size,
COUNT(*) AS event_count
FROM events
GROUP BY devicetype
ORDER BY avg_size DESC
LAST 24 HOURS",
        params: &["time_range"],
    },
    TemplateEntry {
        name: "Error Events",
        category: SYSTEM,
        description: "Find error and failure events",
        query: "SELECT DATEFORMAT(starttime, 'yyyy-MM-dd HH:mm') as time,
QIDNAME(qid) as event_name,
sourceip, destinationip,
LOGSOURCENAME(logsourceid) as source,
UTF8(payload) as details
FROM events
WHERE QIDNAME(qid) ILIKE '%error%'
   OR QIDNAME(qid) ILIKE '%fail%'
   OR QIDNAME(qid) ILIKE '%denied%'
ORDER BY starttime DESC
LIMIT 200
LAST 24 HOURS",
        params: &["time_range"],
    },
    // Windows Events
    TemplateEntry {
        name: "Windows Security Events Overview",
        category: WINDOWS,
        description: "Summary of Windows security events",
        query: "SELECT QIDNAME(qid) as event_name, qid,
COUNT(*) as count
FROM events
WHERE LOGSOURCETYPENAME(devicetype) ILIKE '%Windows Security%'
GROUP BY qid
ORDER BY count DESC
LIMIT 100
LAST 24 HOURS",
        params: &["time_range"],
    },
    TemplateEntry {
        name: "Process Creation (Event ID 4688)",
        category: WINDOWS,
        description: "New process creation events",
        query: "SELECT DATEFORMAT(starttime, 'yyyy-MM-dd HH:mm') as time,
sourceip, username,
UTF8(payload) as details
FROM events
WHERE LOGSOURCETYPENAME(devicetype) ILIKE '%Windows%'
  AND UTF8(payload) ILIKE '%4688%'
ORDER BY starttime DESC
LIMIT 500
LAST 24 HOURS",
        params: &["time_range"],
    },
    TemplateEntry {
        name: "Account Logon Events (4624)",
        category: WINDOWS,
        description: "Successful Windows logon events",
        query: "SELECT DATEFORMAT(starttime, 'yyyy-MM-dd HH:mm') as time,
sourceip, username,
LOGSOURCENAME(logsourceid) as source
FROM events
WHERE LOGSOURCETYPENAME(devicetype) ILIKE '%Windows%'
  AND UTF8(payload) ILIKE '%4624%'
ORDER BY starttime DESC
LIMIT 500
LAST 24 HOURS",
        params: &["time_range"],
    },
    TemplateEntry {
        name: "Account Lockouts (4740)",
        category: WINDOWS,
        description: "Windows account lockout events",
        query: "SELECT DATEFORMAT(starttime, 'yyyy-MM-dd HH:mm') as time,
sourceip, username,
LOGSOURCENAME(logsourceid) as source,
COUNT(*) as lockout_count
FROM events
WHERE LOGSOURCETYPENAME(devicetype) ILIKE '%Windows%'
  AND UTF8(payload) ILIKE '%4740%'
GROUP BY sourceip, username
ORDER BY lockout_count DESC
LAST 24 HOURS",
        params: &["time_range"],
    },
    // Investigation Queries
    TemplateEntry {
        name: "Activity by IP Address",
        category: INVESTIGATION,
        description: "All events for a specific IP",
        query: "SELECT DATEFORMAT(starttime, 'yyyy-MM-dd HH:mm:ss') as time,
QIDNAME(qid) as event_name,
sourceip, destinationip, sourceport, destinationport,
username, magnitude,
LOGSOURCENAME(logsourceid) as source
FROM events
WHERE sourceip = '{{IP_ADDRESS}}'
   OR destinationip = '{{IP_ADDRESS}}'
ORDER BY starttime DESC
LIMIT 1000
LAST 7 DAYS",
        params: &["ip_address", "time_range"],
    },
    TemplateEntry {
        name: "Activity by Username",
        category: INVESTIGATION,
        description: "All events for a specific user",
        query: "SELECT DATEFORMAT(starttime, 'yyyy-MM-dd HH:mm:ss') as time,
QIDNAME(qid) as event_name,
sourceip, destinationip,
LOGSOURCENAME(logsourceid) as source,
magnitude
FROM events
WHERE username ILIKE '{{USERNAME}}'
ORDER BY starttime DESC
LIMIT 1000
LAST 7 DAYS",
        params: &["username", "time_range"],
    },
    TemplateEntry {
        name: "Connections Between Two IPs",
        category: INVESTIGATION,
        description: "Traffic between two specific hosts",
        query: "SELECT DATEFORMAT(starttime, 'yyyy-MM-dd HH:mm') as time,
sourceip, destinationip,
sourceport, destinationport,
SUM(sourcebytes) as bytes_out,
SUM(destinationbytes) as bytes_in
FROM flows
WHERE (sourceip = '{{SOURCE_IP}}' AND destinationip = '{{DEST_IP}}')
   OR (sourceip = '{{DEST_IP}}' AND destinationip = '{{SOURCE_IP}}')
GROUP BY sourceip, destinationip, sourceport, destinationport
ORDER BY time DESC
LAST 7 DAYS",
        params: &["source_ip", "dest_ip", "time_range"],
    },
    TemplateEntry {
        name: "Events in Offense",
        category: INVESTIGATION,
        description: "All events contributing to an offense",
        query: "SELECT DATEFORMAT(starttime, 'yyyy-MM-dd HH:mm:ss') as time,
QIDNAME(qid) as event_name,
sourceip, destinationip, username,
magnitude, credibility,
LOGSOURCENAME(logsourceid) as source
FROM events
WHERE INOFFENSE({{OFFENSE_ID}})
ORDER BY starttime ASC",
        params: &["offense_id"],
    },
];
