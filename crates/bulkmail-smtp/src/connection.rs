//! SMTP session over an arbitrary byte stream.

use std::sync::Arc;

use rustls::pki_types::ServerName;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tokio_rustls::{
    TlsConnector,
    rustls::{ClientConfig, RootCertStore},
};
use tracing::{debug, trace};

use crate::address::Address;
use crate::capability::Capabilities;
use crate::command::Command;
use crate::error::{Error, Result};
use crate::reply::{Reply, ReplyCode, is_final_line};

/// An open SMTP session.
///
/// The stream is generic so the same session logic drives plain TCP, TLS
/// after STARTTLS, and in-memory streams in tests.
#[derive(Debug)]
pub struct Connection<S> {
    stream: BufReader<S>,
    capabilities: Capabilities,
}

/// Opens a plain TCP connection to `host:port` and reads the greeting.
///
/// # Errors
///
/// Returns an error if the TCP connect fails or the server greeting is not
/// a 220 reply.
pub async fn connect(host: &str, port: u16) -> Result<Connection<TcpStream>> {
    debug!(host, port, "Connecting to SMTP relay");
    let stream = TcpStream::connect((host, port)).await?;
    Connection::open(stream).await
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wraps a connected stream and consumes the server greeting.
    ///
    /// # Errors
    ///
    /// Returns an error if the greeting cannot be read or is not a 220 reply.
    pub async fn open(stream: S) -> Result<Self> {
        let mut conn = Self::from_stream(stream);
        let greeting = conn.read_reply().await?;
        if greeting.code != ReplyCode::SERVICE_READY {
            return Err(greeting.into_error());
        }
        trace!(greeting = %greeting.text(), "SMTP greeting");
        Ok(conn)
    }

    fn from_stream(stream: S) -> Self {
        Self {
            stream: BufReader::new(stream),
            capabilities: Capabilities::default(),
        }
    }

    /// Capabilities from the most recent EHLO.
    #[must_use]
    pub const fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Sends EHLO and records the advertised capabilities.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the greeting.
    pub async fn ehlo(&mut self, hello_name: &str) -> Result<()> {
        let reply = self
            .expect(
                Command::Ehlo {
                    hostname: hello_name.to_string(),
                },
                ReplyCode::is_success,
            )
            .await?;
        self.capabilities = Capabilities::from_ehlo(&reply);
        debug!(
            server = %self.capabilities.hostname,
            starttls = self.capabilities.starttls,
            "EHLO accepted"
        );
        Ok(())
    }

    /// Upgrades the session to TLS and repeats EHLO over the encrypted
    /// channel.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSupported`] if STARTTLS was not advertised, or an
    /// error if the command or the TLS handshake fails.
    pub async fn starttls(
        mut self,
        server_host: &str,
        hello_name: &str,
    ) -> Result<Connection<TlsStream<S>>> {
        if !self.capabilities.starttls {
            return Err(Error::NotSupported("STARTTLS".into()));
        }
        self.expect(Command::StartTls, ReplyCode::is_success).await?;

        let server_name = ServerName::try_from(server_host.to_string())
            .map_err(|_| Error::Protocol(format!("Invalid hostname: {server_host}")))?;
        let tls = tls_connector()
            .connect(server_name, self.stream.into_inner())
            .await?;
        debug!(server_host, "TLS established");

        let mut upgraded = Connection::from_stream(tls);
        upgraded.ehlo(hello_name).await?;
        Ok(upgraded)
    }

    /// Authenticates with the PLAIN mechanism.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSupported`] if the server only offers other
    /// mechanisms, or the rejection if the credentials are refused.
    pub async fn auth_plain(&mut self, username: &str, password: &str) -> Result<()> {
        if !self.capabilities.allows_plain() {
            return Err(Error::NotSupported("AUTH PLAIN".into()));
        }
        self.expect(
            Command::AuthPlain {
                username: username.to_string(),
                password: password.to_string(),
            },
            |code| code == ReplyCode::AUTH_OK,
        )
        .await?;
        Ok(())
    }

    /// Runs one mail transaction: envelope, DATA, message, terminator.
    ///
    /// Line endings in `message` are normalized to CRLF and lines starting
    /// with `.` are dot-stuffed.
    ///
    /// # Errors
    ///
    /// Returns an error if no recipient is given, the message is larger
    /// than the advertised SIZE limit, or any step is rejected.
    pub async fn send_mail(&mut self, from: &Address, to: &[Address], message: &[u8]) -> Result<()> {
        if to.is_empty() {
            return Err(Error::InvalidAddress("no recipients".into()));
        }
        let data = encode_data(message);
        if let Some(limit) = self.capabilities.max_size.filter(|&limit| data.len() > limit) {
            return Err(Error::MessageTooLarge {
                size: data.len(),
                limit,
            });
        }

        self.expect(Command::MailFrom(from.clone()), ReplyCode::is_success)
            .await?;
        for rcpt in to {
            self.expect(Command::RcptTo(rcpt.clone()), ReplyCode::is_success)
                .await?;
        }
        self.expect(Command::Data, |code| code == ReplyCode::START_DATA)
            .await?;

        self.write_all(&data).await?;
        let reply = self.read_reply().await?;
        if !reply.is_success() {
            return Err(reply.into_error());
        }
        debug!(code = %reply.code, "Message accepted");
        Ok(())
    }

    /// Sends QUIT and closes the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the server answers QUIT with an error.
    pub async fn quit(mut self) -> Result<()> {
        self.expect(Command::Quit, |code| code == ReplyCode::CLOSING)
            .await?;
        Ok(())
    }

    async fn expect(&mut self, cmd: Command, accept: impl Fn(ReplyCode) -> bool) -> Result<Reply> {
        trace!(verb = cmd.verb(), "SMTP >>");
        self.write_all(&cmd.serialize()).await?;
        let reply = self.read_reply().await?;
        trace!(verb = cmd.verb(), code = %reply.code, "SMTP <<");
        if accept(reply.code) {
            Ok(reply)
        } else {
            debug!(verb = cmd.verb(), code = %reply.code, text = %reply.text(), "Command rejected");
            Err(reply.into_error())
        }
    }

    async fn write_all(&mut self, data: &[u8]) -> Result<()> {
        let writer = self.stream.get_mut();
        writer.write_all(data).await?;
        writer.flush().await?;
        Ok(())
    }

    async fn read_reply(&mut self) -> Result<Reply> {
        let mut lines = Vec::new();
        loop {
            let mut line = String::new();
            if self.stream.read_line(&mut line).await? == 0 {
                return Err(Error::ConnectionClosed);
            }
            let line = line.trim_end_matches(['\r', '\n']).to_string();
            if line.is_empty() {
                continue;
            }

            let last = is_final_line(&line);
            lines.push(line);
            if last {
                break;
            }
        }
        Reply::parse(&lines)
    }
}

/// Normalizes line endings to CRLF, dot-stuffs, and appends the `.`
/// terminator.
fn encode_data(message: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(message.len() + 64);
    let body = message.strip_suffix(b"\n").unwrap_or(message);
    let body = body.strip_suffix(b"\r").unwrap_or(body);

    for line in body.split(|&b| b == b'\n') {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if line.first() == Some(&b'.') {
            out.push(b'.');
        }
        out.extend_from_slice(line);
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(b".\r\n");
    out
}

/// Creates a TLS connector trusting the bundled web PKI roots.
fn tls_connector() -> TlsConnector {
    let root_store = RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
    };

    let config = ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    TlsConnector::from(Arc::new(config))
}
