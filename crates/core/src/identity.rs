//! Google identity assertions.
//!
//! The sign-in widget hands back a JWT; only its claims are read here. The
//! signature is not checked and expiry is ignored.

use base64::Engine;
use base64::engine::general_purpose;
use serde::Deserialize;
use snafu::{OptionExt, ResultExt, Snafu, ensure};

/// Signed-in user profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub subject: String,
    pub name: String,
    pub email: String,
    pub picture: String,
}

impl Identity {
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(self.name.as_str())
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum IdentityError {
    #[snafu(display("identity token has {segments} segments, expected 3"))]
    MalformedToken {
        stage: &'static str,
        segments: usize,
    },
    #[snafu(display("identity token payload is not base64url on `{stage}`: {source}"))]
    PayloadDecode {
        stage: &'static str,
        source: base64::DecodeError,
    },
    #[snafu(display("identity token claims are invalid on `{stage}`: {source}"))]
    ClaimsParse {
        stage: &'static str,
        source: serde_json::Error,
    },
    #[snafu(display("identity token is missing the '{claim}' claim"))]
    MissingClaim {
        stage: &'static str,
        claim: &'static str,
    },
    #[snafu(display("identity token was issued for '{actual}', expected '{expected}'"))]
    AudienceMismatch {
        stage: &'static str,
        expected: String,
        actual: String,
    },
}

pub type IdentityResult<T> = Result<T, IdentityError>;

#[derive(Debug, Deserialize)]
struct GoogleClaims {
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    picture: Option<String>,
    #[serde(default)]
    aud: Option<Audience>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Audience {
    One(String),
    Many(Vec<String>),
}

impl Audience {
    fn contains(&self, expected: &str) -> bool {
        match self {
            Self::One(value) => value == expected,
            Self::Many(values) => values.iter().any(|value| value == expected),
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::One(value) => value.clone(),
            Self::Many(values) => values.join(","),
        }
    }
}

/// Decodes the claims of a Google ID token into an [`Identity`].
///
/// When `expected_audience` is set, tokens minted for another client id are
/// rejected. Tokens without an `aud` claim are accepted.
pub fn decode_id_token(token: &str, expected_audience: Option<&str>) -> IdentityResult<Identity> {
    let token = token.trim();
    let segments = token.split('.').collect::<Vec<_>>();
    ensure!(
        segments.len() == 3,
        MalformedTokenSnafu {
            stage: "split-token",
            segments: segments.len(),
        }
    );

    let payload = decode_segment(segments[1])?;
    let claims = serde_json::from_slice::<GoogleClaims>(&payload).context(ClaimsParseSnafu {
        stage: "parse-claims",
    })?;

    if let (Some(expected), Some(audience)) = (expected_audience, claims.aud.as_ref())
        && !audience.contains(expected)
    {
        return AudienceMismatchSnafu {
            stage: "check-audience",
            expected: expected.to_string(),
            actual: audience.describe(),
        }
        .fail();
    }

    let subject = claims
        .sub
        .and_then(nonempty)
        .context(MissingClaimSnafu {
            stage: "read-subject",
            claim: "sub",
        })?;
    let email = claims.email.and_then(nonempty).unwrap_or_default();
    let name = claims
        .name
        .and_then(nonempty)
        .unwrap_or_else(|| email.clone());

    Ok(Identity {
        subject,
        name,
        email,
        picture: claims.picture.unwrap_or_default(),
    })
}

fn decode_segment(segment: &str) -> IdentityResult<Vec<u8>> {
    general_purpose::URL_SAFE_NO_PAD
        .decode(segment)
        .or_else(|_| general_purpose::URL_SAFE.decode(segment))
        .context(PayloadDecodeSnafu {
            stage: "decode-payload",
        })
}

fn nonempty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn token_with(claims: serde_json::Value) -> String {
        let payload = serde_json::to_vec(&claims).unwrap();
        let payload = general_purpose::URL_SAFE_NO_PAD.encode(payload);
        format!("header.{payload}.signature")
    }

    #[test]
    fn decodes_profile_claims() {
        let token = token_with(json!({
            "sub": "1234",
            "name": "Ada Lovelace",
            "email": "ada@example.com",
            "picture": "https://example.com/ada.png",
            "aud": "client-1",
        }));

        let identity = decode_id_token(&token, Some("client-1")).unwrap();
        assert_eq!(
            identity,
            Identity {
                subject: "1234".to_string(),
                name: "Ada Lovelace".to_string(),
                email: "ada@example.com".to_string(),
                picture: "https://example.com/ada.png".to_string(),
            }
        );
        assert_eq!(identity.first_name(), "Ada");
    }

    #[test]
    fn padded_payload_is_accepted() {
        let payload = general_purpose::URL_SAFE.encode(br#"{"sub":"1","name":"Al"}"#);
        let identity = decode_id_token(&format!("h.{payload}.s"), None).unwrap();
        assert_eq!(identity.name, "Al");
    }

    #[test]
    fn missing_name_falls_back_to_email() {
        let token = token_with(json!({"sub": "1", "email": "grace@example.com"}));
        let identity = decode_id_token(&token, None).unwrap();
        assert_eq!(identity.name, "grace@example.com");
        assert_eq!(identity.picture, "");
    }

    #[test]
    fn wrong_segment_count_is_malformed() {
        assert!(matches!(
            decode_id_token("only.two", None),
            Err(IdentityError::MalformedToken { segments: 2, .. })
        ));
    }

    #[test]
    fn garbage_payload_fails_to_decode() {
        assert!(matches!(
            decode_id_token("h.%%%.s", None),
            Err(IdentityError::PayloadDecode { .. })
        ));
    }

    #[test]
    fn non_json_payload_fails_to_parse() {
        let payload = general_purpose::URL_SAFE_NO_PAD.encode("not json");
        assert!(matches!(
            decode_id_token(&format!("h.{payload}.s"), None),
            Err(IdentityError::ClaimsParse { .. })
        ));
    }

    #[test]
    fn subject_is_required() {
        let token = token_with(json!({"name": "Nobody", "sub": "  "}));
        assert!(matches!(
            decode_id_token(&token, None),
            Err(IdentityError::MissingClaim { claim: "sub", .. })
        ));
    }

    #[test]
    fn foreign_audience_is_rejected() {
        let token = token_with(json!({"sub": "1", "aud": ["other-client"]}));
        assert!(matches!(
            decode_id_token(&token, Some("client-1")),
            Err(IdentityError::AudienceMismatch { actual, .. }) if actual == "other-client"
        ));
    }
}
