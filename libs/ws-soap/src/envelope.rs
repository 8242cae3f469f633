//! Envelope construction and response extraction.
//!
//! Extraction is pattern based and namespace-prefix agnostic: any prefix (or
//! none) is accepted on `Body`, `Fault` and the fault child elements. Both SOAP
//! 1.1 (`faultcode`/`faultstring`) and SOAP 1.2 (`Code/Value`, `Reason/Text`)
//! fault shapes are recognised regardless of the configured version.

use std::sync::LazyLock;

use regex::Regex;
use ws_call::Fault;

use crate::config::SoapVersion;

const PREFIX: &str = "soapenv";

#[allow(clippy::expect_used)] // literal pattern, it does not panic
static BODY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<(?:[\w.-]+:)?Body\b[^>]*[^/]>(.*)</(?:[\w.-]+:)?Body\s*>|<(?:[\w.-]+:)?Body\s*>(.*)</(?:[\w.-]+:)?Body\s*>")
        .expect("static regex should not panic")
});

#[allow(clippy::expect_used)] // literal pattern, it does not panic
static EMPTY_BODY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(?:[\w.-]+:)?Body\b[^>]*/>")
        .expect("static regex should not panic")
});

#[allow(clippy::expect_used)] // literal pattern, it does not panic
static FAULT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(?:[\w.-]+:)?Fault[\s/>]")
        .expect("static regex should not panic")
});

#[allow(clippy::expect_used)] // literal pattern, it does not panic
static FAULTCODE_11: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<(?:[\w.-]+:)?faultcode\b[^>]*>(.*?)</(?:[\w.-]+:)?faultcode\s*>")
        .expect("static regex should not panic")
});

#[allow(clippy::expect_used)] // literal pattern, it does not panic
static FAULTSTRING_11: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<(?:[\w.-]+:)?faultstring\b[^>]*>(.*?)</(?:[\w.-]+:)?faultstring\s*>")
        .expect("static regex should not panic")
});

#[allow(clippy::expect_used)] // literal pattern, it does not panic
static CODE_12: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)<(?:[\w.-]+:)?Code\b[^>]*>\s*<(?:[\w.-]+:)?Value\b[^>]*>(.*?)</(?:[\w.-]+:)?Value\s*>",
    )
    .expect("static regex should not panic")
});

#[allow(clippy::expect_used)] // literal pattern, it does not panic
static REASON_12: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)<(?:[\w.-]+:)?Reason\b[^>]*>\s*<(?:[\w.-]+:)?Text\b[^>]*>(.*?)</(?:[\w.-]+:)?Text\s*>",
    )
    .expect("static regex should not panic")
});

/// Wrap a body payload in a SOAP envelope with an empty header.
#[must_use]
pub fn build_envelope(version: SoapVersion, payload: &str) -> String {
    format!(
        "<{PREFIX}:Envelope xmlns:{PREFIX}=\"{ns}\"><{PREFIX}:Header/><{PREFIX}:Body>{payload}</{PREFIX}:Body></{PREFIX}:Envelope>",
        ns = version.namespace(),
    )
}

/// The trimmed contents of the envelope's `Body` element.
///
/// Returns `Some("")` for a self-closing `Body`, `None` when the document has
/// no `Body` at all.
#[must_use]
pub fn extract_body(envelope: &str) -> Option<String> {
    if let Some(caps) = BODY.captures(envelope) {
        let inner = caps.get(1).or_else(|| caps.get(2))?;
        return Some(inner.as_str().trim().to_owned());
    }
    EMPTY_BODY.is_match(envelope).then(String::new)
}

/// Extract a fault from a response document.
///
/// Returns `None` unless the document contains a `Fault` element carrying
/// both a code and a reason.
#[must_use]
pub fn parse_fault(envelope: &str) -> Option<Fault> {
    let start = FAULT.find(envelope)?.start();
    let fault = &envelope[start..];

    let code = capture_text(&FAULTCODE_11, fault).or_else(|| capture_text(&CODE_12, fault))?;
    let reason =
        capture_text(&FAULTSTRING_11, fault).or_else(|| capture_text(&REASON_12, fault))?;

    Some(Fault::new(code, reason))
}

fn capture_text(pattern: &Regex, haystack: &str) -> Option<String> {
    let raw = pattern.captures(haystack)?.get(1)?.as_str();
    Some(unescape(strip_cdata(raw.trim())))
}

fn strip_cdata(text: &str) -> &str {
    text.strip_prefix("<![CDATA[")
        .and_then(|rest| rest.strip_suffix("]]>"))
        .unwrap_or(text)
}

/// Resolve the predefined XML entities and numeric character references.
/// Unknown references are kept as written.
fn unescape(text: &str) -> String {
    if !text.contains('&') {
        return text.to_owned();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let Some(semi) = tail.find(';') else {
            out.push_str(tail);
            return out;
        };
        let entity = &tail[1..semi];
        match decode_entity(entity) {
            Some(ch) => out.push(ch),
            None => out.push_str(&tail[..=semi]),
        }
        rest = &tail[semi + 1..];
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let number = entity.strip_prefix('#')?;
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    const SOAP11_FAULT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<SOAP-ENV:Envelope xmlns:SOAP-ENV="http://schemas.xmlsoap.org/soap/envelope/">
  <SOAP-ENV:Body>
    <SOAP-ENV:Fault>
      <faultcode>SOAP-ENV:Client</faultcode>
      <faultstring xml:lang="en">No flight with number 'KL1653' &amp; date 2006-01-31</faultstring>
    </SOAP-ENV:Fault>
  </SOAP-ENV:Body>
</SOAP-ENV:Envelope>"#;

    const SOAP12_FAULT: &str = r#"<env:Envelope xmlns:env="http://www.w3.org/2003/05/soap-envelope">
  <env:Body>
    <env:Fault>
      <env:Code>
        <env:Value>env:Sender</env:Value>
        <env:Subcode><env:Value>m:MessageTimeout</env:Value></env:Subcode>
      </env:Code>
      <env:Reason>
        <env:Text xml:lang="en">Sender Timeout</env:Text>
        <env:Text xml:lang="nl">Afzender time-out</env:Text>
      </env:Reason>
    </env:Fault>
  </env:Body>
</env:Envelope>"#;

    #[test]
    fn test_build_envelope_soap11() {
        let envelope = build_envelope(SoapVersion::Soap11, "<GetQuote>MSFT</GetQuote>");
        assert_eq!(
            envelope,
            "<soapenv:Envelope xmlns:soapenv=\"http://schemas.xmlsoap.org/soap/envelope/\">\
             <soapenv:Header/><soapenv:Body><GetQuote>MSFT</GetQuote></soapenv:Body></soapenv:Envelope>"
        );
    }

    #[test]
    fn test_build_envelope_soap12_namespace() {
        let envelope = build_envelope(SoapVersion::Soap12, "");
        assert!(envelope.contains("http://www.w3.org/2003/05/soap-envelope"));
        assert!(envelope.contains("<soapenv:Body></soapenv:Body>"));
    }

    #[test]
    fn test_extract_body_round_trips_build() {
        let payload = "<ns:GetFlightsRequest xmlns:ns=\"urn:airline\"><ns:from>AMS</ns:from></ns:GetFlightsRequest>";
        let envelope = build_envelope(SoapVersion::Soap11, payload);
        assert_eq!(extract_body(&envelope).as_deref(), Some(payload));
    }

    #[test]
    fn test_extract_body_with_attributes_and_whitespace() {
        let doc = "<s:Envelope xmlns:s=\"x\"><s:Body wsu:Id=\"b1\">\n  <r>1</r>\n</s:Body></s:Envelope>";
        assert_eq!(extract_body(doc).as_deref(), Some("<r>1</r>"));
    }

    #[test]
    fn test_extract_body_unprefixed() {
        let doc = "<Envelope><Body><ok/></Body></Envelope>";
        assert_eq!(extract_body(doc).as_deref(), Some("<ok/>"));
    }

    #[test]
    fn test_extract_body_self_closing_and_missing() {
        assert_eq!(
            extract_body("<s:Envelope xmlns:s=\"x\"><s:Body/></s:Envelope>").as_deref(),
            Some("")
        );
        assert!(extract_body("<html><body>502 Bad Gateway</body></html>").is_none());
    }

    #[test]
    fn test_parse_soap11_fault() {
        let fault = parse_fault(SOAP11_FAULT).unwrap();
        assert_eq!(fault.code, "SOAP-ENV:Client");
        assert_eq!(
            fault.reason,
            "No flight with number 'KL1653' & date 2006-01-31"
        );
    }

    #[test]
    fn test_parse_soap12_fault_takes_first_text() {
        let fault = parse_fault(SOAP12_FAULT).unwrap();
        assert_eq!(fault.code, "env:Sender");
        assert_eq!(fault.reason, "Sender Timeout");
    }

    #[test]
    fn test_parse_fault_without_reason_is_not_a_fault() {
        let doc = "<s:Envelope><s:Body><s:Fault><faultcode>s:Server</faultcode></s:Fault></s:Body></s:Envelope>";
        assert!(parse_fault(doc).is_none());

        let doc12 = "<env:Fault><env:Code><env:Value>env:Receiver</env:Value></env:Code></env:Fault>";
        assert!(parse_fault(doc12).is_none());
    }

    #[test]
    fn test_parse_fault_requires_fault_element_and_code() {
        assert!(parse_fault("<s:Envelope><s:Body><ok/></s:Body></s:Envelope>").is_none());
        assert!(parse_fault("<s:Body><s:Fault><faultstring>x</faultstring></s:Fault></s:Body>").is_none());
        // A payload element merely starting with "Fault" is not a fault.
        assert!(parse_fault("<s:Body><FaultReport><faultcode>x</faultcode></FaultReport></s:Body>").is_none());
    }

    #[test]
    fn test_parse_fault_cdata_reason() {
        let doc = "<Fault><faultcode>Client.AuthenticationFailed</faultcode>\
                   <faultstring><![CDATA[bad <token>]]></faultstring></Fault>";
        let fault = parse_fault(doc).unwrap();
        assert_eq!(fault.code, "Client.AuthenticationFailed");
        assert_eq!(fault.reason, "bad <token>");
    }

    #[test]
    fn test_unescape_entities() {
        assert_eq!(unescape("a &lt;b&gt; &quot;c&quot; &apos;d&apos;"), "a <b> \"c\" 'd'");
        assert_eq!(unescape("&#65;&#x42;&#X43;"), "ABC");
        assert_eq!(unescape("&unknown; & dangling"), "&unknown; & dangling");
        assert_eq!(unescape("plain"), "plain");
    }
}
