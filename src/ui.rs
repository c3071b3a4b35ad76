pub fn login_page() -> &'static str {
    LOGIN_HTML
}

/// Embedded page registry for the clean-URL routes. Returns None for slugs
/// the portal does not serve.
pub fn render_page(slug: &str) -> Option<String> {
    let (title, content) = match slug {
        "home" => ("Dashboard", HOME_CONTENT),
        "factcheck" => ("Fact Checking", FACTCHECK_CONTENT),
        "social-media" => ("Social Media Intelligence", SOCIAL_MEDIA_CONTENT),
        "domain-intel" => ("Domain Intelligence", DOMAIN_INTEL_CONTENT),
        "breach-data" => ("Breach Data", BREACH_DATA_CONTENT),
        _ => return None,
    };

    Some(
        LAYOUT_HTML
            .replace("{{TITLE}}", title)
            .replace("{{CONTENT}}", content),
    )
}

const LOGIN_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>OSINT Portal - Sign in</title>
  <style>
    :root {
      --bg: #10151d;
      --card: #1a2230;
      --ink: #e8edf4;
      --muted: #8b98ab;
      --accent: #4da3ff;
      --danger: #ff6b6b;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Segoe UI", "Helvetica Neue", sans-serif;
      display: grid;
      place-items: center;
      padding: 24px;
    }

    .card {
      width: min(380px, 100%);
      background: var(--card);
      border: 1px solid rgba(255, 255, 255, 0.06);
      border-radius: 14px;
      padding: 32px;
      display: grid;
      gap: 18px;
    }

    h1 {
      margin: 0;
      font-size: 1.5rem;
    }

    .subtitle {
      margin: 0;
      color: var(--muted);
      font-size: 0.92rem;
    }

    label {
      display: grid;
      gap: 6px;
      font-size: 0.85rem;
      color: var(--muted);
    }

    input {
      background: #0d1219;
      border: 1px solid rgba(255, 255, 255, 0.1);
      border-radius: 8px;
      color: var(--ink);
      padding: 10px 12px;
      font-size: 1rem;
    }

    button {
      background: var(--accent);
      border: none;
      border-radius: 8px;
      color: #0b1018;
      cursor: pointer;
      font-size: 1rem;
      font-weight: 600;
      padding: 12px;
    }

    .status {
      color: var(--danger);
      font-size: 0.9rem;
      min-height: 1.2em;
      margin: 0;
    }
  </style>
</head>
<body>
  <main class="card">
    <h1>OSINT Portal</h1>
    <p class="subtitle">Sign in with your account name or verified email.</p>
    <form id="login-form">
      <label>Username or email
        <input id="identity" name="identity" autocomplete="username" required />
      </label>
      <label>Password
        <input id="password" name="password" type="password" autocomplete="current-password" required />
      </label>
      <p class="status" id="status"></p>
      <button type="submit">Sign in</button>
    </form>
  </main>

  <script>
    const form = document.getElementById('login-form');
    const statusEl = document.getElementById('status');

    fetch('/api/auth-status')
      .then((res) => res.json())
      .then((data) => {
        if (data.authenticated) {
          window.location.href = '/home';
        }
      })
      .catch(() => {});

    form.addEventListener('submit', async (event) => {
      event.preventDefault();
      statusEl.textContent = '';

      const identity = document.getElementById('identity').value.trim();
      const password = document.getElementById('password').value;
      const body = identity.includes('@')
        ? { email: identity, password }
        : { username: identity, password };

      try {
        const res = await fetch('/login', {
          method: 'POST',
          headers: { 'content-type': 'application/json' },
          body: JSON.stringify(body)
        });
        const data = await res.json();
        if (res.ok && data.success) {
          window.location.href = '/home';
        } else {
          statusEl.textContent = data.message || 'Login failed';
        }
      } catch (err) {
        statusEl.textContent = 'Unable to reach the server';
      }
    });
  </script>
</body>
</html>
"#;

const LAYOUT_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>OSINT Portal - {{TITLE}}</title>
  <style>
    :root {
      --bg: #10151d;
      --card: #1a2230;
      --ink: #e8edf4;
      --muted: #8b98ab;
      --accent: #4da3ff;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Segoe UI", "Helvetica Neue", sans-serif;
      padding: 24px;
    }

    .shell {
      width: min(960px, 100%);
      margin: 0 auto;
      display: grid;
      gap: 20px;
    }

    header {
      display: flex;
      align-items: center;
      justify-content: space-between;
      gap: 16px;
    }

    h1 {
      margin: 0;
      font-size: 1.6rem;
    }

    nav {
      display: flex;
      flex-wrap: wrap;
      gap: 10px;
    }

    nav a {
      color: var(--muted);
      text-decoration: none;
      font-size: 0.9rem;
    }

    nav a:hover {
      color: var(--accent);
    }

    .card {
      background: var(--card);
      border: 1px solid rgba(255, 255, 255, 0.06);
      border-radius: 14px;
      padding: 22px;
    }

    .grid {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(220px, 1fr));
      gap: 14px;
    }

    .stat .label {
      display: block;
      color: var(--muted);
      font-size: 0.8rem;
      text-transform: uppercase;
      letter-spacing: 0.1em;
    }

    .stat .value {
      display: block;
      font-size: 1.6rem;
      font-weight: 600;
      color: var(--accent);
    }

    table {
      width: 100%;
      border-collapse: collapse;
    }

    th, td {
      text-align: left;
      padding: 10px 8px;
      border-bottom: 1px solid rgba(255, 255, 255, 0.06);
      font-size: 0.95rem;
    }

    td a {
      color: var(--accent);
      text-decoration: none;
    }

    .logout {
      background: transparent;
      border: 1px solid rgba(255, 255, 255, 0.2);
      border-radius: 8px;
      color: var(--muted);
      cursor: pointer;
      padding: 8px 14px;
    }
  </style>
</head>
<body>
  <div class="shell">
    <header>
      <h1>{{TITLE}}</h1>
      <nav>
        <a href="/home">Home</a>
        <a href="/factcheck">Fact check</a>
        <a href="/social-media">Social media</a>
        <a href="/domain-intel">Domains</a>
        <a href="/breach-data">Breaches</a>
        <button class="logout" id="logout-btn" type="button">Sign out</button>
      </nav>
    </header>
{{CONTENT}}
  </div>

  <script>
    document.getElementById('logout-btn').addEventListener('click', async () => {
      try {
        await fetch('/logout', {
          method: 'POST',
          headers: { 'content-type': 'application/json' },
          body: JSON.stringify({})
        });
      } finally {
        window.location.href = '/';
      }
    });
  </script>
</body>
</html>
"#;

const HOME_CONTENT: &str = r#"    <section class="card">
      <div class="grid">
        <div class="stat">
          <span class="label">Total visits</span>
          <span class="value" id="total-visitors">--</span>
        </div>
        <div class="stat">
          <span class="label">Unique visitors</span>
          <span class="value" id="unique-visitors">--</span>
        </div>
        <div class="stat">
          <span class="label">Today</span>
          <span class="value" id="today-visitors">--</span>
        </div>
        <div class="stat">
          <span class="label">Unique today</span>
          <span class="value" id="today-unique-visitors">--</span>
        </div>
      </div>
    </section>
    <section class="card">
      <table>
        <thead>
          <tr><th>Category</th><th>Description</th></tr>
        </thead>
        <tbody>
          <tr><td><a href="/factcheck">Fact checking</a></td><td>Verify claims, images, and viral content</td></tr>
          <tr><td><a href="/social-media">Social media</a></td><td>Profile and handle lookups across platforms</td></tr>
          <tr><td><a href="/domain-intel">Domain intelligence</a></td><td>WHOIS, DNS history, and certificates</td></tr>
          <tr><td><a href="/breach-data">Breach data</a></td><td>Credential exposure and leak search</td></tr>
        </tbody>
      </table>
    </section>
    <script>
      fetch('/api/visitor-stats')
        .then((res) => res.json())
        .then((stats) => {
          document.getElementById('total-visitors').textContent = stats.totalVisitors;
          document.getElementById('unique-visitors').textContent = stats.uniqueVisitors;
          document.getElementById('today-visitors').textContent = stats.todayVisitors;
          document.getElementById('today-unique-visitors').textContent = stats.todayUniqueVisitors;
        })
        .catch(() => {});
    </script>
"#;

const FACTCHECK_CONTENT: &str = r#"    <section class="card">
      <table>
        <thead>
          <tr><th>Tool</th><th>Use</th></tr>
        </thead>
        <tbody>
          <tr><td><a href="https://toolbox.google.com/factcheck/explorer" rel="noopener">Fact Check Explorer</a></td><td>Search published fact checks</td></tr>
          <tr><td><a href="https://tineye.com" rel="noopener">TinEye</a></td><td>Reverse image search</td></tr>
          <tr><td><a href="https://www.invid-project.eu/tools-and-services/invid-verification-plugin/" rel="noopener">InVID</a></td><td>Video verification</td></tr>
          <tr><td><a href="https://archive.org/web/" rel="noopener">Wayback Machine</a></td><td>Page history snapshots</td></tr>
        </tbody>
      </table>
    </section>
"#;

const SOCIAL_MEDIA_CONTENT: &str = r#"    <section class="card">
      <table>
        <thead>
          <tr><th>Tool</th><th>Use</th></tr>
        </thead>
        <tbody>
          <tr><td><a href="https://whatsmyname.app" rel="noopener">WhatsMyName</a></td><td>Username enumeration across sites</td></tr>
          <tr><td><a href="https://instantusername.com" rel="noopener">Instant Username</a></td><td>Handle availability checks</td></tr>
          <tr><td><a href="https://www.social-searcher.com" rel="noopener">Social Searcher</a></td><td>Cross-platform post search</td></tr>
        </tbody>
      </table>
    </section>
"#;

const DOMAIN_INTEL_CONTENT: &str = r#"    <section class="card">
      <table>
        <thead>
          <tr><th>Tool</th><th>Use</th></tr>
        </thead>
        <tbody>
          <tr><td><a href="https://crt.sh" rel="noopener">crt.sh</a></td><td>Certificate transparency search</td></tr>
          <tr><td><a href="https://securitytrails.com" rel="noopener">SecurityTrails</a></td><td>DNS history and subdomains</td></tr>
          <tr><td><a href="https://urlscan.io" rel="noopener">urlscan.io</a></td><td>Website scanner and screenshots</td></tr>
          <tr><td><a href="https://viewdns.info" rel="noopener">ViewDNS</a></td><td>WHOIS and reverse IP lookups</td></tr>
        </tbody>
      </table>
    </section>
"#;

const BREACH_DATA_CONTENT: &str = r#"    <section class="card">
      <table>
        <thead>
          <tr><th>Tool</th><th>Use</th></tr>
        </thead>
        <tbody>
          <tr><td><a href="https://haveibeenpwned.com" rel="noopener">Have I Been Pwned</a></td><td>Email and domain exposure</td></tr>
          <tr><td><a href="https://dehashed.com" rel="noopener">DeHashed</a></td><td>Credential leak search</td></tr>
          <tr><td><a href="https://intelx.io" rel="noopener">Intelligence X</a></td><td>Leak and paste archive</td></tr>
        </tbody>
      </table>
    </section>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_slugs_render_with_title_and_layout() {
        let page = render_page("home").expect("home page");
        assert!(page.contains("<title>OSINT Portal - Dashboard</title>"));
        assert!(page.contains("/api/visitor-stats"));
        assert!(!page.contains("{{TITLE}}"));
        assert!(!page.contains("{{CONTENT}}"));
    }

    #[test]
    fn unknown_slug_renders_nothing() {
        assert!(render_page("no-such-page").is_none());
        assert!(render_page("").is_none());
    }

    #[test]
    fn every_served_slug_is_protected() {
        for slug in ["home", "factcheck", "social-media", "domain-intel", "breach-data"] {
            assert!(crate::auth::PROTECTED_PAGES.contains(&slug), "{slug} unprotected");
        }
    }
}
