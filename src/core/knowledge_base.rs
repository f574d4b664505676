//! Static, read-only database of all security findings the scanner can
//! raise, with severities, risk-point weights, human-readable explanations,
//! and remediation steps. Grading and recommendation text are driven
//! entirely by this table.

use crate::core::models::{AnalysisFinding, Severity};
use std::fmt;

/// High-level categories for security findings, one per scan dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FindingCategory {
    /// Findings related to DNS records (SPF, DMARC, DKIM, CAA).
    Dns,
    /// Findings related to SSL/TLS certificates and configuration.
    Ssl,
    /// Findings related to HTTP security headers.
    Http,
}

impl FindingCategory {
    /// Short tag used to prefix recommendation strings.
    pub fn tag(self) -> &'static str {
        match self {
            FindingCategory::Dns => "DNS",
            FindingCategory::Ssl => "SSL",
            FindingCategory::Http => "HTTP",
        }
    }
}

impl fmt::Display for FindingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FindingCategory::Dns => write!(f, "DNS Configuration"),
            FindingCategory::Ssl => write!(f, "SSL/TLS Certificate"),
            FindingCategory::Http => write!(f, "HTTP Security Headers"),
        }
    }
}

/// Full detail for a specific finding code.
pub struct FindingDetail {
    /// Unique, machine-readable identifier (e.g. "DNS_DMARC_MISSING").
    pub code: &'static str,
    /// Short, human-readable title.
    pub title: &'static str,
    /// The scan dimension this finding belongs to.
    pub category: FindingCategory,
    /// Severity bucket the finding is counted under.
    pub severity: Severity,
    /// Risk points the finding contributes to its dimension (0-100 scale,
    /// higher is worse). Sub-check failures carry 100: worst-case grade.
    pub risk_points: u32,
    /// What the finding means and why it matters.
    pub description: &'static str,
    /// Actionable steps to fix the issue.
    pub remediation: &'static str,
}

impl FindingDetail {
    /// Recommendation string for this finding, tagged by dimension.
    pub fn recommendation(&self) -> String {
        format!("[{}] {}: {}", self.category.tag(), self.title, self.remediation)
    }
}

/// The centralized knowledge base of all possible findings.
static FINDINGS: &[FindingDetail] = &[
    // --- DNS: Email Security & Domain Integrity ---
    FindingDetail {
        code: "DNS_LOOKUP_FAILED",
        title: "DNS Lookups Failed",
        category: FindingCategory::Dns,
        severity: Severity::Critical,
        risk_points: 100,
        description: "The scanner could not complete DNS record lookups for the target domain. The domain may be misconfigured, or the resolver was unreachable within the scan timeout.",
        remediation: "Verify the domain's authoritative nameservers respond to TXT and CAA queries and that the zone is publicly resolvable."
    },
    FindingDetail {
        code: "DNS_DMARC_MISSING",
        title: "DMARC Record Missing",
        category: FindingCategory::Dns,
        severity: Severity::Critical,
        risk_points: 20,
        description: "DMARC is an email authentication policy that protects your domain from being used for email spoofing and phishing. It tells receiving mail servers how to handle emails that fail authentication checks.",
        remediation: "Add a DMARC record to your domain's DNS settings. Start with a monitoring policy like 'v=DMARC1; p=none;' and gradually move to 'p=quarantine' or 'p=reject' after analyzing reports."
    },
    FindingDetail {
        code: "DNS_DMARC_POLICY_NONE",
        title: "DMARC Policy is 'none'",
        category: FindingCategory::Dns,
        severity: Severity::High,
        risk_points: 10,
        description: "Your DMARC policy is in 'monitoring only' mode. It reports fraudulent emails but does not instruct receivers to block or quarantine them, offering no active protection against spoofing.",
        remediation: "After ensuring your legitimate emails pass SPF/DKIM, update your DMARC policy to 'p=quarantine' (sends to spam) or 'p=reject' (blocks delivery) to actively protect your domain."
    },
    FindingDetail {
        code: "DNS_SPF_MISSING",
        title: "SPF Record Missing",
        category: FindingCategory::Dns,
        severity: Severity::High,
        risk_points: 15,
        description: "Sender Policy Framework (SPF) is a DNS record that lists all the servers authorized to send email on behalf of your domain. Without it, attackers can more easily spoof emails from your domain.",
        remediation: "Create a TXT record for your domain that defines your authorized mail servers. A simple example for Google Workspace is 'v=spf1 include:_spf.google.com ~all'."
    },
    FindingDetail {
        code: "DNS_SPF_POLICY_SOFTFAIL",
        title: "SPF Policy is 'Softfail'",
        category: FindingCategory::Dns,
        severity: Severity::Medium,
        risk_points: 5,
        description: "Your SPF record uses '~all' (softfail), which suggests that receiving servers should accept but mark suspicious mail. This is less secure than '-all' (fail), which instructs servers to reject the mail.",
        remediation: "If you are confident your SPF record lists all legitimate mail sources, consider changing the ending from '~all' to '-all' for stricter enforcement."
    },
    FindingDetail {
        code: "DNS_SPF_POLICY_NEUTRAL",
        title: "SPF Policy is 'Neutral'",
        category: FindingCategory::Dns,
        severity: Severity::Medium,
        risk_points: 8,
        description: "Your SPF record uses '?all' (neutral), which provides no definitive policy on the mail's legitimacy. It essentially tells receivers 'I don't know if this is valid,' offering no protection.",
        remediation: "This policy should be avoided. Change '?all' to '~all' (softfail) or, preferably, '-all' (fail) to provide a clear security policy to receiving mail servers."
    },
    FindingDetail {
        code: "DNS_DKIM_MISSING",
        title: "DKIM Record Missing",
        category: FindingCategory::Dns,
        severity: Severity::Medium,
        risk_points: 5,
        description: "DKIM (DomainKeys Identified Mail) adds a tamper-proof digital signature to emails. This signature confirms that the email was sent from your domain and that its content has not been altered in transit.",
        remediation: "Enable DKIM signing in your email service provider's control panel. This typically involves generating a key and adding the public part as a TXT record to your DNS."
    },
    FindingDetail {
        code: "DNS_CAA_MISSING",
        title: "CAA Record Missing",
        category: FindingCategory::Dns,
        severity: Severity::Medium,
        risk_points: 4,
        description: "A Certificate Authority Authorization (CAA) record specifies which Certificate Authorities (CAs) are allowed to issue SSL/TLS certificates for your domain. This acts as a safeguard against certificate mis-issuance.",
        remediation: "Add a CAA record to your DNS to lock down certificate issuance to your chosen provider(s). For example: '0 issue \"letsencrypt.org\"'."
    },

    // --- SSL/TLS: Secure Communication Layer ---
    FindingDetail {
        code: "SSL_HANDSHAKE_FAILED",
        title: "TLS Handshake Failed",
        category: FindingCategory::Ssl,
        severity: Severity::Critical,
        risk_points: 100,
        description: "The scanner could not establish a secure TLS connection with the server. This can be caused by an invalid/missing certificate, unsupported cipher suites, or other critical server misconfigurations.",
        remediation: "Ensure a valid, trusted SSL/TLS certificate is installed on the server for the correct domain. Use an online tool like SSL Labs to diagnose TLS configuration issues."
    },
    FindingDetail {
        code: "SSL_NO_CERTIFICATE_FOUND",
        title: "No Certificate Presented",
        category: FindingCategory::Ssl,
        severity: Severity::High,
        risk_points: 30,
        description: "The TLS connection succeeded but the server did not present a certificate. Clients cannot verify the server's identity, leaving the connection open to impersonation.",
        remediation: "Configure the server to present its full certificate chain during the TLS handshake."
    },
    FindingDetail {
        code: "SSL_EXPIRED",
        title: "SSL Certificate Expired",
        category: FindingCategory::Ssl,
        severity: Severity::Critical,
        risk_points: 50,
        description: "The website's SSL certificate is expired. This will cause browsers to show prominent security warnings, block access, and destroy user trust.",
        remediation: "Renew the SSL certificate immediately. Implement automated renewal processes (e.g., via Let's Encrypt / Certbot) to prevent this from happening in the future."
    },
    FindingDetail {
        code: "SSL_EXPIRING_SOON",
        title: "SSL Certificate Expiring Soon",
        category: FindingCategory::Ssl,
        severity: Severity::High,
        risk_points: 15,
        description: "The SSL certificate will expire in less than 30 days. This is an early warning to prevent service disruption and loss of trust.",
        remediation: "Renew the SSL certificate before it expires. If you have automated renewals, verify that the system is functioning correctly."
    },

    // --- HTTP Headers: Hardening the Application Layer ---
    FindingDetail {
        code: "HEADERS_REQUEST_FAILED",
        title: "HTTP Request Failed",
        category: FindingCategory::Http,
        severity: Severity::Critical,
        risk_points: 100,
        description: "The scanner could not connect to the target server to check its HTTP headers. The server might be down, unreachable, or blocking automated requests.",
        remediation: "Verify that the target is online and accessible from the public internet. Check for firewalls or network issues that might be blocking the connection."
    },
    FindingDetail {
        code: "HEADERS_HSTS_MISSING",
        title: "HSTS Header Missing",
        category: FindingCategory::Http,
        severity: Severity::Critical,
        risk_points: 15,
        description: "The HTTP Strict-Transport-Security (HSTS) header instructs browsers to only communicate with your site over HTTPS. It protects against protocol downgrade attacks and cookie hijacking.",
        remediation: "Add the 'Strict-Transport-Security' header to your web server responses. A strong value is 'max-age=31536000; includeSubDomains; preload'."
    },
    FindingDetail {
        code: "HEADERS_CSP_MISSING",
        title: "CSP Header Missing",
        category: FindingCategory::Http,
        severity: Severity::Critical,
        risk_points: 15,
        description: "Content-Security-Policy (CSP) is a powerful security layer that helps prevent attacks like Cross-Site Scripting (XSS) and data injection by defining which resources a browser is allowed to load.",
        remediation: "Implement a Content-Security-Policy header that defines trusted sources for scripts, styles, and other assets. Start with a restrictive policy and gradually open it up as needed."
    },
    FindingDetail {
        code: "HEADERS_X_FRAME_OPTIONS_MISSING",
        title: "X-Frame-Options Missing",
        category: FindingCategory::Http,
        severity: Severity::High,
        risk_points: 10,
        description: "This header protects your visitors against 'clickjacking' attacks, where an attacker loads your site in an invisible iframe to trick users into clicking on malicious content.",
        remediation: "Add the 'X-Frame-Options' header and set it to 'DENY' (no framing allowed) or 'SAMEORIGIN' (only you can frame your site)."
    },
    FindingDetail {
        code: "HEADERS_X_CONTENT_TYPE_OPTIONS_MISSING",
        title: "X-Content-Type-Options Missing",
        category: FindingCategory::Http,
        severity: Severity::Medium,
        risk_points: 5,
        description: "This header prevents browsers from trying to guess the content type of a file (MIME sniffing). This mitigates attacks where a file disguised as an image could be executed as a script.",
        remediation: "Add the 'X-Content-Type-Options' header and set its value to 'nosniff'. It's a simple and effective security enhancement."
    },
    FindingDetail {
        code: "HEADERS_REFERRER_POLICY_MISSING",
        title: "Referrer-Policy Missing",
        category: FindingCategory::Http,
        severity: Severity::Medium,
        risk_points: 5,
        description: "Without a Referrer-Policy header, browsers may send full URLs (including paths and query strings) to third-party sites, leaking information about your users' navigation.",
        remediation: "Add the 'Referrer-Policy' header with a strict value such as 'strict-origin-when-cross-origin' or 'no-referrer'."
    },
    FindingDetail {
        code: "HEADERS_PERMISSIONS_POLICY_MISSING",
        title: "Permissions-Policy Missing",
        category: FindingCategory::Http,
        severity: Severity::Medium,
        risk_points: 5,
        description: "The Permissions-Policy header controls which browser features (geolocation, camera, microphone) the page and embedded frames may use. Without it, embedded content inherits full feature access.",
        remediation: "Add the 'Permissions-Policy' header and disable features you do not use, e.g. 'geolocation=(), microphone=(), camera=()'."
    },
];

/// Retrieves the full detail for a given finding code.
///
/// Returns `None` if the code does not exist in the knowledge base.
pub fn get_finding_detail(code: &str) -> Option<&'static FindingDetail> {
    FINDINGS.iter().find(|f| f.code == code)
}

/// Builds a finding for a known code, taking the severity from the table
/// so scanners can never drift from the knowledge base.
pub fn finding(code: &'static str) -> AnalysisFinding {
    let severity = get_finding_detail(code)
        .map(|d| d.severity)
        .unwrap_or(Severity::Medium);
    AnalysisFinding::new(severity, code)
}
