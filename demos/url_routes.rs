//! Routing URLs to handlers by their longest registered path prefix
use radix_index::Trie;
use url::Url;

const HANDLERS: &[&str] = &["site root", "api", "user api", "admin api", "static files"];

fn route_key(url: &Url) -> String {
    format!("{}{}", url.host_str().unwrap_or_default(), url.path())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut routes = Trie::new();

    // Register a handler index for each mount point
    let mounts = [
        "https://example.com/",
        "https://example.com/api/",
        "https://example.com/api/users/",
        "https://example.com/api/users/admin/",
        "https://example.com/static/",
    ];
    for (handler, mount) in mounts.iter().enumerate() {
        let url = Url::parse(mount)?;
        routes.insert(route_key(&url), handler as i64)?;
    }

    let requests = [
        "https://example.com/api/users/42?fields=name",
        "https://example.com/api/users/admin/audit",
        "https://example.com/static/img/logo.png",
        "https://example.com/about",
        "https://other.org/api/",
    ];

    println!("Dispatching requests:");
    for request in requests.iter() {
        let url = Url::parse(request)?;
        let key = route_key(&url);

        match routes.longest_prefix_of(key.as_bytes()) {
            Some((_, handler)) => println!("  {} → {}", url, HANDLERS[handler as usize]),
            None => println!("  {} → no route", url),
        }

        // Every mount point that would also accept this request
        let fallbacks: Vec<&str> = routes
            .prefixes_of(&key)
            .skip(1)
            .map(|(_, handler)| HANDLERS[handler as usize])
            .collect();
        if !fallbacks.is_empty() {
            println!("      falls back to: {}", fallbacks.join(", "));
        }
    }

    // List the mount points under the API
    println!("\nAPI mounts:");
    for (key, handler) in routes.view_subtrie("example.com/api/").iter() {
        println!("  {} → {}", String::from_utf8_lossy(&key), HANDLERS[handler as usize]);
    }

    Ok(())
}
