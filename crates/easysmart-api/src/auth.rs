// Switch session login
//
// The login form posts to `/logon.cgi`; the switch answers 200 whether or
// not the credentials were right and, on success, sets the session
// cookie in the client's jar. Rejection only shows up as a non-200 on the
// next page fetch.

use reqwest::header::REFERER;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::client::EasySmartClient;
use crate::error::Error;

const LOGIN_PATH: &str = "/logon.cgi";
const LOGOUT_PAGE: &str = "Logout.htm";

impl EasySmartClient {
    /// Submit the login form.
    ///
    /// `POST /logon.cgi` with `logon=Login&username=..&password=..` and a
    /// `Referer` pointing at the logout page, which the switch checks.
    /// Only transport failures are reported here.
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<(), Error> {
        let url = self.page_url(LOGIN_PATH)?;
        debug!(username, "logging in at {}", url);

        let form = [
            ("logon", "Login"),
            ("username", username),
            ("password", password.expose_secret()),
        ];

        let resp = self
            .http()
            .post(url)
            .timeout(self.timeout())
            .header(REFERER, format!("{}/{LOGOUT_PAGE}", self.origin()))
            .form(&form)
            .send()
            .await
            .map_err(|e| Error::from_transport(e, self.timeout()))?;

        debug!(status = %resp.status(), "login form submitted");
        Ok(())
    }
}
