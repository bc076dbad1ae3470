//! Navigation for a terminal: there is no page to change, so tell the user
//! where the browser would have gone.

#[cfg(test)]
#[path = "navigator_test.rs"]
mod navigator_test;

use session::Navigator;

pub struct HintNavigator {
    login_path: String,
}

impl HintNavigator {
    pub fn new(login_path: impl Into<String>) -> Self {
        Self { login_path: login_path.into() }
    }
}

impl Navigator for HintNavigator {
    fn navigate(&self, path: &str) {
        eprintln!("{}", hint_for(path, &self.login_path));
    }
}

fn hint_for(path: &str, login_path: &str) -> String {
    if path == login_path {
        "Signed out. Run `portal-cli login` to sign in again.".to_owned()
    } else {
        format!("Dashboard: {path}")
    }
}
