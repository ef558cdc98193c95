// src/transport/tls.rs
use openssl::pkey::PKey;
use openssl::ssl::{SslConnector, SslMethod, SslVerifyMode};
use openssl::x509::X509;

use super::options::RequestOptions;
use crate::error::Result;

impl RequestOptions {
    /// Builds an openssl connector from the TLS material in these options.
    ///
    /// Chain validation is left to openssl; with `strict_ssl` cleared the
    /// peer certificate is not verified at all.
    pub fn ssl_connector(&self) -> Result<SslConnector> {
        let mut builder = SslConnector::builder(SslMethod::tls_client())?;

        if let Some(ca) = &self.ca {
            for cert in X509::stack_from_pem(ca)? {
                builder.cert_store_mut().add_cert(cert)?;
            }
        }

        if let Some(cert) = &self.cert {
            let mut chain = X509::stack_from_pem(cert)?.into_iter();
            if let Some(leaf) = chain.next() {
                builder.set_certificate(&leaf)?;
            }
            for intermediate in chain {
                builder.add_extra_chain_cert(intermediate)?;
            }
        }

        if let Some(key) = &self.key {
            let key = PKey::private_key_from_pem(key)?;
            builder.set_private_key(&key)?;
            builder.check_private_key()?;
        }

        if !self.strict_ssl {
            builder.set_verify(SslVerifyMode::NONE);
        }

        Ok(builder.build())
    }
}
