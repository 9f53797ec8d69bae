// Prompt templates for the ranking pipeline.
// `{placeholders}` are filled by `render`; everything else is literal, JSON braces included.

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::ranking::RankingRequest;

/// Top-level field the area completion must use.
pub const AREA_RATING_FIELD: &str = "areasWithRating";
/// Top-level field the contact completion must use.
pub const CONTACT_RATING_FIELD: &str = "contactsWithRating";

pub const RATING_SYSTEM_TEMPLATE: &str = r#"{json_only}

Output a single JSON object with exactly this shape, where each number is an integer percentage (0 - 100) of how well that {subject} fits the user's problem:
{
  "{field}": {
{entries}
  }
}

Rate exactly the {subject_plural} listed above, using the keys verbatim. Do not add any other keys."#;

pub const AREA_USER_TEMPLATE: &str = r#"The user's name is {name} and they work at the company {company}.
I am {profile}.
Give me the percentages of how strongly the areas {candidates} influence the problem: "{problem}"."#;

pub const CONTACT_USER_TEMPLATE: &str = r#"The user's name is {name} and they work at the company {company}.
I am {profile}.
Give me the percentages of how well each of these contacts can help me ({candidates}) with my problem: "{problem}"."#;

/// A rendered system + user message pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// A contact offered to the model: only the id and what it does.
#[derive(Debug, Clone, Copy)]
pub struct ContactCandidate<'a> {
    pub id: &'a str,
    pub description: &'a str,
}

pub fn build_area_prompt(candidate_areas: &[String], request: &RankingRequest) -> Prompt {
    let keys: Vec<&str> = candidate_areas.iter().map(String::as_str).collect();
    let candidates = candidate_areas.join(", ");

    Prompt {
        system: rating_system(AREA_RATING_FIELD, "area", "areas", &keys),
        user: render(
            AREA_USER_TEMPLATE,
            &[
                ("name", request.name.as_str()),
                ("company", request.company.as_str()),
                ("profile", request.profile.descriptor()),
                ("candidates", candidates.as_str()),
                ("problem", request.problem.as_str()),
            ],
        ),
    }
}

pub fn build_contact_prompt(candidates: &[ContactCandidate<'_>], request: &RankingRequest) -> Prompt {
    let keys: Vec<&str> = candidates.iter().map(|c| c.id).collect();
    let listing = candidates
        .iter()
        .map(|c| format!("{}: {}", c.id, c.description))
        .collect::<Vec<_>>()
        .join(", ");

    Prompt {
        system: rating_system(CONTACT_RATING_FIELD, "contact", "contacts", &keys),
        user: render(
            CONTACT_USER_TEMPLATE,
            &[
                ("name", request.name.as_str()),
                ("company", request.company.as_str()),
                ("profile", request.profile.descriptor()),
                ("candidates", listing.as_str()),
                ("problem", request.problem.as_str()),
            ],
        ),
    }
}

fn rating_system(field: &str, subject: &str, subject_plural: &str, keys: &[&str]) -> String {
    let entries = keys
        .iter()
        .map(|key| format!("    {}: [percentage (0 - 100)]", json_key(key)))
        .collect::<Vec<_>>()
        .join(",\n");

    render(
        RATING_SYSTEM_TEMPLATE,
        &[
            ("json_only", JSON_ONLY_SYSTEM),
            ("subject", subject),
            ("subject_plural", subject_plural),
            ("field", field),
            ("entries", entries.as_str()),
        ],
    )
}

/// Quotes a key the way it must appear in the model's JSON.
fn json_key(key: &str) -> String {
    serde_json::to_string(key).unwrap_or_else(|_| format!("\"{key}\""))
}

/// Single-pass substitution of `{name}` placeholders. Substituted values are
/// never rescanned, so user text containing braces comes through verbatim.
fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];

        let matched = vars.iter().find(|(key, _)| {
            tail[1..]
                .strip_prefix(key)
                .is_some_and(|after| after.starts_with('}'))
        });

        match matched {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len() + 2..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}
