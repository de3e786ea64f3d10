//! The fixed audit questionnaires.
//!
//! This is static reference data: it is compiled in, never persisted, and
//! served read-only to the form.

use serde::Serialize;

const YES_OR_ISSUE: &[&str] = &["Yes", "Still working on an issue"];
const YES_OR_NO: &[&str] = &["Yes", "No"];

/// A named audit domain owning a fixed questionnaire.
#[derive(Debug, Serialize)]
pub struct Area {
    pub id: &'static str,
    pub name: &'static str,
    pub questions: &'static [Question],
}

/// A single-choice question. IDs are unique within their area.
#[derive(Debug, Serialize)]
pub struct Question {
    pub id: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<&'static str>,
    pub text: &'static str,
    pub required: bool,
    pub options: &'static [&'static str],
}

impl Area {
    /// Look up an area by its ID.
    pub fn find(id: &str) -> Option<&'static Area> {
        AREAS.iter().find(|area| area.id == id)
    }
}

const fn question(
    id: u32,
    section: Option<&'static str>,
    text: &'static str,
    options: &'static [&'static str],
) -> Question {
    Question {
        id,
        section,
        text,
        required: true,
        options,
    }
}

pub static AREAS: &[Area] = &[
    Area {
        id: "desktop-client-user",
        name: "Desktop/Client/User",
        questions: &[
            question(
                1,
                Some("Personnel Management"),
                "Have all Faculty/Staff hired in the past month, or who had a problem last month, been granted correct permissions in the appropriate Batten shared resources?",
                YES_OR_ISSUE,
            ),
            question(
                2,
                None,
                "Have all Faculty/Staff hired in the past month, or who had a problem last month, been placed in the appropriate communications lists?",
                YES_OR_ISSUE,
            ),
            question(
                3,
                None,
                "Have all Faculty/Staff hired in the past month, or who had a problem last month, been provided the appropriate hardware and properly trained on its usage?",
                YES_OR_ISSUE,
            ),
            question(
                4,
                None,
                "Have all Faculty/Staff who have left in the past month, or who had a problem last month, had correct permissions revoked from all Batten shared resources?",
                YES_OR_ISSUE,
            ),
            question(
                5,
                None,
                "Have all Faculty/Staff who have left in the past month, or who had a problem last month, been removed from all communications lists and replaced by someone to sustain the process?",
                YES_OR_ISSUE,
            ),
            question(
                6,
                None,
                "Have all Faculty/Staff who have left in the past month, or who had a problem last month, turned in their assigned hardware and had it accounted for?",
                YES_OR_ISSUE,
            ),
            question(
                7,
                Some("Hardware/Inventory"),
                "Have all hardware items purchased in the past month been properly accounted and/or inventory as required?",
                YES_OR_ISSUE,
            ),
            question(
                8,
                None,
                "Is all Batten hardware being properly managed based on Batten best practices?",
                YES_OR_ISSUE,
            ),
            question(
                9,
                Some("Software"),
                "Are all Batten software titles being properly managed and accounted for based on Batten best practices?",
                YES_OR_ISSUE,
            ),
            question(
                10,
                None,
                "Have all new hires been added or removed from the onboarding Canvas site?",
                YES_OR_NO,
            ),
        ],
    },
    Area {
        id: "data-analytics",
        name: "Data and Analytics",
        questions: &[
            question(
                1,
                Some("Access Controls"),
                "Have permissions on all datasets (Fabric, SQL, Dataverse, PowerBI, Salesforce) been reviewed to ensure only authorized users have access?",
                YES_OR_ISSUE,
            ),
            question(
                2,
                Some("Backup & Recovery"),
                "Have all backups run successfully and are Fabric Workspaces synced to DevOps repos?",
                YES_OR_ISSUE,
            ),
            question(
                3,
                Some("Data Retention"),
                "Has data been archived or purged per UVA/VITA policy?",
                YES_OR_ISSUE,
            ),
            question(
                4,
                Some("Data Quality"),
                "Has data accuracy, completeness, and consistency been validated across all systems?",
                YES_OR_ISSUE,
            ),
            question(
                5,
                Some("Documentation"),
                "Are all systems and processes documented and current?",
                YES_OR_ISSUE,
            ),
            question(
                6,
                Some("Security & Monitoring"),
                "Are access logs and audit trails being retained and reviewed?",
                YES_OR_ISSUE,
            ),
        ],
    },
    Area {
        id: "school-systems",
        name: "School Systems",
        questions: &[
            question(
                1,
                Some("User Access Review"),
                "Has a review of all Faculty and Staff users been reviewed for appropriate permissions within Slate?",
                YES_OR_ISSUE,
            ),
            question(
                2,
                None,
                "Have all accounts been deactivated for departing Faculty/Staff at Batten using the Batten IT guidelines and best practices?",
                YES_OR_ISSUE,
            ),
            question(
                3,
                None,
                "Have all new accounts been created for new Faculty/Staff at Batten using the Batten IT guidelines and best practices?",
                YES_OR_ISSUE,
            ),
            question(
                4,
                None,
                "Have all Slate user role assignments been verified to align with current job responsibilities and the principle of least privilege?",
                YES_OR_ISSUE,
            ),
            question(
                5,
                None,
                "Have any shared or generic Slate accounts been identified and reviewed for necessity and appropriate access controls?",
                YES_OR_ISSUE,
            ),
            question(
                6,
                Some("Account Reconciliation"),
                "Has a reconciliation been completed between active Slate users and the current HR roster to identify orphaned or unused accounts?",
                YES_OR_ISSUE,
            ),
            question(
                7,
                Some("Integration & Service Accounts"),
                "Have all Slate integration accounts (service accounts, API connections) been reviewed for security and appropriate credential management?",
                YES_OR_ISSUE,
            ),
            question(
                8,
                Some("Documentation"),
                "Has documentation been reviewed and updated for Slate access request and approval workflows?",
                YES_OR_ISSUE,
            ),
            question(
                9,
                Some("Elevated Privileges"),
                "Have all users with elevated privileges (admin roles, query access, application management) in Slate been reviewed and certified as appropriate?",
                YES_OR_ISSUE,
            ),
            question(
                10,
                Some("Audit & Monitoring"),
                "Has audit logging been reviewed in Slate for any unusual access patterns, data exports, or unauthorized configuration changes?",
                YES_OR_ISSUE,
            ),
        ],
    },
];

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn question_ids_unique_within_area() {
        for area in AREAS {
            let ids: HashSet<_> = area.questions.iter().map(|q| q.id).collect();
            assert_eq!(ids.len(), area.questions.len(), "{}", area.id);
            assert!(area.questions.iter().all(|q| !q.options.is_empty()));
        }
    }

    #[test]
    fn find_area() {
        assert_eq!(Area::find("data-analytics").unwrap().name, "Data and Analytics");
        assert!(Area::find("nope").is_none());
    }
}
