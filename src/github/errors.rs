use octocrab::Error as OctocrabError;

#[derive(Debug)]
pub enum GitHubError {
    ApiError(OctocrabError),
    UploadRejected {
        asset: String,
        status: u16,
        body: String,
    },
    NetworkError(reqwest::Error),
    IoError(std::io::Error),
    InvalidUploadUrl(String),
}

impl GitHubError {
    /// HTTP status of a GitHub API error response, if there was one
    pub fn status_code(&self) -> Option<u16> {
        match self {
            GitHubError::ApiError(OctocrabError::GitHub { source, .. }) => {
                Some(source.status_code.as_u16())
            }
            GitHubError::UploadRejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<OctocrabError> for GitHubError {
    fn from(err: OctocrabError) -> Self {
        GitHubError::ApiError(err)
    }
}

impl From<reqwest::Error> for GitHubError {
    fn from(err: reqwest::Error) -> Self {
        GitHubError::NetworkError(err)
    }
}

impl From<std::io::Error> for GitHubError {
    fn from(err: std::io::Error) -> Self {
        GitHubError::IoError(err)
    }
}

fn write_status_guidance(f: &mut std::fmt::Formatter<'_>, status: u16) -> std::fmt::Result {
    match status {
        401 => {
            writeln!(f, "🔧 AUTHENTICATION FAILED:")?;
            writeln!(f, "   → GITHUB_TOKEN is invalid or expired")?;
            write!(f, "   → Create a new token at: https://github.com/settings/tokens")
        }
        403 => {
            writeln!(f, "🔧 PERMISSION DENIED:")?;
            writeln!(f, "   → Token needs 'contents: write' on the report repository")?;
            write!(f, "   → Check rate limits: gh api rate_limit")
        }
        404 => {
            writeln!(f, "🔧 RESOURCE NOT FOUND:")?;
            writeln!(f, "   → Repository may not exist or be private")?;
            write!(f, "   → Check GITHUB_OWNER and GITHUB_REPO settings")
        }
        422 => {
            writeln!(f, "🔧 VALIDATION ERROR:")?;
            writeln!(f, "   → An asset with the same name may still be attached")?;
            write!(f, "   → Check GITHUB_RELEASE_TAG and the release's assets")
        }
        _ => {
            writeln!(f, "🔧 TROUBLESHOOTING:")?;
            writeln!(f, "   → Test connection: curl -I https://api.github.com")?;
            write!(f, "   → GitHub status: https://status.github.com")
        }
    }
}

impl std::fmt::Display for GitHubError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GitHubError::ApiError(octocrab_err) => {
                writeln!(f, "GitHub API Error")?;
                writeln!(f, "────────────────")?;
                match octocrab_err {
                    OctocrabError::GitHub { source, .. } => {
                        writeln!(f, "🌐 HTTP {}: {}", source.status_code, source.message)?;
                        writeln!(f)?;
                        write_status_guidance(f, source.status_code.as_u16())
                    }
                    other => {
                        write!(f, "🌐 {other}\n\n")?;
                        write_status_guidance(f, 0)
                    }
                }
            }
            GitHubError::UploadRejected {
                asset,
                status,
                body,
            } => {
                writeln!(f, "GitHub Release Asset Upload Failed")?;
                writeln!(f, "──────────────────────────────────")?;
                write!(f, "📦 Uploading '{asset}' returned HTTP {status}: {body}\n\n")?;
                write_status_guidance(f, *status)
            }
            GitHubError::NetworkError(err) => {
                writeln!(f, "GitHub Network Error")?;
                writeln!(f, "───────────────────")?;
                write!(f, "🌐 {err}\n\n")?;
                write_status_guidance(f, 0)
            }
            GitHubError::IoError(io_err) => {
                writeln!(f, "File System Error")?;
                writeln!(f, "─────────────────")?;
                write!(f, "📁 {io_err}\n\n")?;
                writeln!(f, "🔧 POSSIBLE CAUSES:")?;
                writeln!(f, "   → The report file was removed before upload")?;
                write!(f, "   → File permissions issue")
            }
            GitHubError::InvalidUploadUrl(url) => {
                writeln!(f, "GitHub Release Error")?;
                writeln!(f, "────────────────────")?;
                write!(f, "🔗 Release upload URL '{url}' could not be parsed")
            }
        }
    }
}

impl std::error::Error for GitHubError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GitHubError::ApiError(err) => Some(err),
            GitHubError::NetworkError(err) => Some(err),
            GitHubError::IoError(err) => Some(err),
            _ => None,
        }
    }
}
