//! Route patterns and URL parsing

use crate::registry::Options;
use serde_json::Value;
use zeyon_foundation::{Error, Result};

/// 경로 패턴의 한 세그먼트
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
    /// 나머지 전체 (`*`)
    Wildcard,
}

/// `/users/:id`, `/files/*`, `*` 형태의 경로 패턴
#[derive(Debug, Clone)]
pub struct RoutePattern {
    pattern: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    pub fn parse(pattern: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let parts: Vec<&str> = split_segments(pattern).collect();

        for (i, part) in parts.iter().enumerate() {
            let segment = if *part == "*" {
                if i + 1 != parts.len() {
                    return Err(Error::Route(format!(
                        "wildcard must be the last segment: '{}'",
                        pattern
                    )));
                }
                Segment::Wildcard
            } else if let Some(name) = part.strip_prefix(':') {
                if name.is_empty() {
                    return Err(Error::Route(format!("empty parameter name in '{}'", pattern)));
                }
                Segment::Param(name.to_string())
            } else {
                Segment::Static(part.to_string())
            };
            segments.push(segment);
        }

        Ok(Self {
            pattern: pattern.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// 경로 매칭, 성공 시 파라미터 반환 (와일드카드 나머지는 `*` 키)
    pub fn matches(&self, path: &str) -> Option<Options> {
        let parts: Vec<&str> = split_segments(path).collect();
        let mut params = Options::new();

        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Wildcard => {
                    params.insert("*".into(), Value::String(parts[i.min(parts.len())..].join("/")));
                    return Some(params);
                }
                Segment::Static(expected) => {
                    if parts.get(i) != Some(&expected.as_str()) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let value = parts.get(i)?;
                    params.insert(name.clone(), Value::String(decode(value).ok()?));
                }
            }
        }

        (parts.len() == self.segments.len()).then_some(params)
    }
}

fn split_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

// ============================================================================
// URL 파싱
// ============================================================================

/// 경로와 쿼리로 나뉜 URL
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedUrl {
    /// 정규화된 경로 (`/`로 시작, 끝 `/` 없음)
    pub path: String,
    pub query: Options,
}

/// URL을 경로와 쿼리로 분리 (`#` 이후는 무시)
pub fn parse_url(url: &str) -> Result<ParsedUrl> {
    let url = url.split('#').next().unwrap_or_default();
    let (path, query) = match url.split_once('?') {
        Some((path, query)) => (path, query),
        None => (url, ""),
    };

    Ok(ParsedUrl {
        path: normalize_path(path),
        query: parse_query(query)?,
    })
}

/// 쿼리 문자열 파싱 (같은 키가 반복되면 마지막 값)
pub fn parse_query(query: &str) -> Result<Options> {
    let mut params = Options::new();
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = decode_form(key)?;
        if key.is_empty() {
            continue;
        }
        params.insert(key, Value::String(decode_form(value)?));
    }
    Ok(params)
}

/// 쿼리 문자열 생성
pub fn build_query(query: &Options) -> String {
    query
        .iter()
        .map(|(k, v)| {
            let value = match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            format!("{}={}", urlencoding::encode(k), urlencoding::encode(&value))
        })
        .collect::<Vec<_>>()
        .join("&")
}

pub fn normalize_path(path: &str) -> String {
    let joined = split_segments(path).collect::<Vec<_>>().join("/");
    format!("/{}", joined)
}

/// 경로 세그먼트 디코딩 (`+`는 그대로)
fn decode(s: &str) -> Result<String> {
    urlencoding::decode(s)
        .map(|c| c.into_owned())
        .map_err(|e| Error::Route(format!("invalid percent-encoding in '{}': {}", s, e)))
}

/// 쿼리 값 디코딩 (`+`는 공백)
fn decode_form(s: &str) -> Result<String> {
    decode(&s.replace('+', " "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_param_match() {
        let pattern = RoutePattern::parse("/users/:id/posts/:post").unwrap();
        let params = pattern.matches("/users/42/posts/hello%20world").unwrap();
        assert_eq!(params.get("id"), Some(&json!("42")));
        assert_eq!(params.get("post"), Some(&json!("hello world")));

        assert!(pattern.matches("/users/42").is_none());
        assert!(pattern.matches("/users/42/posts/1/extra").is_none());
        assert!(pattern.matches("/people/42/posts/1").is_none());
    }

    #[test]
    fn test_plus_is_literal_in_path() {
        let pattern = RoutePattern::parse("/tags/:tag").unwrap();
        let params = pattern.matches("/tags/c++").unwrap();
        assert_eq!(params.get("tag"), Some(&json!("c++")));

        let parsed = parse_url("/tags/c++?q=c++").unwrap();
        assert_eq!(parsed.query.get("q"), Some(&json!("c  ")));
    }

    #[test]
    fn test_root_and_wildcard() {
        let root = RoutePattern::parse("/").unwrap();
        assert!(root.matches("/").is_some());
        assert!(root.matches("/a").is_none());

        let files = RoutePattern::parse("/files/*").unwrap();
        let params = files.matches("/files/a/b.txt").unwrap();
        assert_eq!(params.get("*"), Some(&json!("a/b.txt")));
        assert_eq!(files.matches("/files").unwrap().get("*"), Some(&json!("")));

        let any = RoutePattern::parse("*").unwrap();
        assert!(any.matches("/anything/at/all").is_some());
    }

    #[test]
    fn test_invalid_patterns() {
        assert!(matches!(RoutePattern::parse("/*/x"), Err(Error::Route(_))));
        assert!(matches!(RoutePattern::parse("/users/:"), Err(Error::Route(_))));
    }

    #[test]
    fn test_parse_url() {
        let parsed = parse_url("users//42/?tab=posts&q=a+b&q=c%26d#top").unwrap();
        assert_eq!(parsed.path, "/users/42");
        assert_eq!(parsed.query.get("tab"), Some(&json!("posts")));
        assert_eq!(parsed.query.get("q"), Some(&json!("c&d")));

        let plain = parse_url("/").unwrap();
        assert_eq!(plain.path, "/");
        assert!(plain.query.is_empty());
    }

    #[test]
    fn test_query_decoding() {
        let query = parse_query("a+b=c+d&flag&=skip").unwrap();
        assert_eq!(query.get("a b"), Some(&json!("c d")));
        assert_eq!(query.get("flag"), Some(&json!("")));
        assert_eq!(query.len(), 2);

        assert_eq!(build_query(&query), "a%20b=c%20d&flag=");
    }
}
