//! Prompt construction and reply parsing.

use regex::Regex;
use serde_json::Value;
use siteaudit_core::model::{AiRecommendation, AuditRecord};

use super::error::LlmError;

const FENCED_JSON: &str = r"```json\s*([\s\S]*?)\s*```";
const BARE_OBJECT: &str = r"\{[\s\S]*\}";

fn json_or_empty<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
}

/// Consultant-style prompt over the technical findings of one audit.
pub fn build_prompt(record: &AuditRecord) -> String {
    let domain = siteaudit_core::url::extract_domain(&record.url);
    let dns_records = record.dns_analysis.as_ref().map(|dns| json_or_empty(&dns.records));

    format!(
        r#"You are an expert web consultant at a web development agency. Analyze the website audit data below and write a professional, detailed summary plus 3-5 prioritized recommendations for a prospective client.

Answer in JSON with the keys "summary" and "priorities", where priorities is an array of objects with the keys "title" and "description".

Website URL: {url}

TECHNICAL AUDIT DATA:
Performance score: {performance}/100
SEO score: {seo}/100
Accessibility score: {accessibility}/100
Best practices score: {best_practices}/100

Performance audits: {performance_audits}
SEO analysis: {seo_analysis}
Security: {security}
Technologies: {tech_stack}
Server: {server}
DNS records: {dns}

GUIDELINES:
1. Write a business-oriented summary explaining why these improvements matter for {domain}
2. Focus on how the recommendations improve conversion rate, user experience and search rankings
3. Give detailed, implementation-specific advice rather than generic tips
4. Write in a professional tone aimed at the client's business needs

Output format:
```json
{{
  "summary": "professional summary focused on the business value of the work",
  "priorities": [
    {{ "title": "specific, actionable priority", "description": "detailed recommendation with clear business value" }}
  ]
}}
```"#,
        url = record.url,
        performance = record.performance.score,
        seo = record.seo.score,
        accessibility = record.accessibility.score,
        best_practices = record.best_practices.score,
        performance_audits = json_or_empty(&record.performance.audits),
        seo_analysis = record.seo_analysis.as_ref().map(json_or_empty).unwrap_or_else(|| "{}".into()),
        security = record.security_info.as_ref().map(json_or_empty).unwrap_or_else(|| "{}".into()),
        tech_stack = record.tech_stack.as_ref().map(json_or_empty).unwrap_or_else(|| "[]".into()),
        server = record.server_info.as_ref().map(json_or_empty).unwrap_or_else(|| "{}".into()),
        dns = dns_records.unwrap_or_else(|| "[]".into()),
    )
}

/// Pull a recommendation out of free-form model output.
///
/// Accepts a fenced `json` block or else the outermost `{...}` span, and only
/// if it carries a string `summary` and a `priorities` array.
pub fn parse_reply(reply: &str) -> Result<AiRecommendation, LlmError> {
    let candidate = Regex::new(FENCED_JSON)
        .ok()
        .and_then(|re| re.captures(reply))
        .and_then(|caps| caps.get(1))
        .or_else(|| Regex::new(BARE_OBJECT).ok().and_then(|re| re.find(reply)))
        .map(|m| m.as_str())
        .ok_or_else(|| LlmError::Unusable("no JSON object in reply".into()))?;

    let value: Value = serde_json::from_str(candidate).map_err(|e| LlmError::Unusable(e.to_string()))?;

    let has_summary = value.get("summary").is_some_and(Value::is_string);
    let has_priorities = value.get("priorities").is_some_and(Value::is_array);
    if !has_summary || !has_priorities {
        return Err(LlmError::Unusable("reply lacks summary or priorities".into()));
    }

    serde_json::from_value(value).map_err(|e| LlmError::Unusable(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use siteaudit_core::model::AuditCategory;

    fn record() -> AuditRecord {
        AuditRecord {
            url: "https://www.example.com/".into(),
            timestamp: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            performance: AuditCategory { score: 56, audits: vec![] },
            seo: AuditCategory { score: 63, audits: vec![] },
            accessibility: AuditCategory { score: 49, audits: vec![] },
            best_practices: AuditCategory { score: 66, audits: vec![] },
            ai_recommendations: None,
            key_issues: vec![],
            screenshot: None,
            server_info: None,
            dns_analysis: None,
            security_info: None,
            domain_reputation: None,
            seo_analysis: None,
            tech_stack: None,
        }
    }

    #[test]
    fn test_prompt_carries_scores_and_domain() {
        let prompt = build_prompt(&record());
        assert!(prompt.contains("Performance score: 56/100"));
        assert!(prompt.contains("Best practices score: 66/100"));
        assert!(prompt.contains("why these improvements matter for example.com"));
        assert!(prompt.contains("Technologies: []"));
    }

    #[test]
    fn test_parse_fenced_reply() {
        let reply = "Here you go:\n```json\n{\"summary\": \"Solid site\", \"priorities\": [{\"title\": \"Cache\", \"description\": \"Add caching\"}]}\n```\nGood luck";
        let parsed = parse_reply(reply).unwrap();
        assert_eq!(parsed.summary, "Solid site");
        assert_eq!(parsed.priorities[0].title, "Cache");
    }

    #[test]
    fn test_parse_bare_object() {
        let reply = "Result: {\"summary\": \"Ok\", \"priorities\": []} end";
        assert_eq!(parse_reply(reply).unwrap().summary, "Ok");
    }

    #[test]
    fn test_parse_rejects_incomplete_objects() {
        assert!(matches!(parse_reply("no json here"), Err(LlmError::Unusable(_))));
        assert!(matches!(parse_reply("{\"summary\": \"x\"}"), Err(LlmError::Unusable(_))));
        assert!(matches!(parse_reply("{\"summary\": \"x\", \"priorities\": {}}"), Err(LlmError::Unusable(_))));
        assert!(matches!(parse_reply("{broken"), Err(LlmError::Unusable(_))));
    }
}
