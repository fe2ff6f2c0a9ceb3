//! URL synthesis for affiliate links and cover images.

use crate::config::AffiliateConfig;

/// Marketplace search link for `"<author> <title>"` carrying the affiliate tag.
#[must_use]
pub fn purchase_link(config: &AffiliateConfig, title: &str, author: &str) -> String {
    let query = format!("{author} {title}");
    format!(
        "{}?k={}&tag={}",
        config.marketplace_search_url,
        urlencoding::encode(query.trim()),
        urlencoding::encode(&config.tag)
    )
}

/// Deterministic placeholder cover captioned with the item title.
#[must_use]
pub fn placeholder_image(base: &str, title: &str) -> String {
    let caption = if title.trim().is_empty() {
        "No Cover"
    } else {
        title.trim()
    };
    format!("{base}?text={}", urlencoding::encode(caption))
}

#[must_use]
pub fn upgrade_to_https(url: &str) -> String {
    match url.get(..7) {
        Some(scheme) if scheme.eq_ignore_ascii_case("http://") => {
            format!("https://{}", &url[7..])
        }
        _ => url.to_string(),
    }
}

/// Rewrites a stored link to carry `tag`. Returns `None` when the link is
/// already tagged with something other than `legacy_tag`, or is not a link.
#[must_use]
pub fn retag_link(link: &str, legacy_tag: &str, tag: &str) -> Option<String> {
    if link.is_empty() || link == "#" {
        return None;
    }

    if !legacy_tag.is_empty() && legacy_tag != tag && link.contains(legacy_tag) {
        return Some(link.replace(legacy_tag, tag));
    }

    if link.contains("tag=") {
        return None;
    }

    let separator = if link.contains('?') { '&' } else { '?' };
    Some(format!("{link}{separator}tag={}", urlencoding::encode(tag)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purchase_link_default_tag() {
        let config = AffiliateConfig::default();
        let link = purchase_link(&config, "The Name of the Rose", "Umberto Eco");
        assert_eq!(
            link,
            "https://amazon.com/s?k=Umberto%20Eco%20The%20Name%20of%20the%20Rose&tag=busybibliophi-20"
        );
    }

    #[test]
    fn test_purchase_link_override_and_encoding() {
        let config = AffiliateConfig {
            tag: "shop-21".to_string(),
            ..AffiliateConfig::default()
        };
        let link = purchase_link(&config, "C++ & You?", "A/B");
        assert!(link.contains("k=A%2FB%20C%2B%2B%20%26%20You%3F"));
        assert!(link.ends_with("&tag=shop-21"));
    }

    #[test]
    fn test_placeholder_image_embeds_title() {
        let url = placeholder_image("https://placehold.co/400x600/e2e8f0/475569", "Dune Messiah");
        assert_eq!(
            url,
            "https://placehold.co/400x600/e2e8f0/475569?text=Dune%20Messiah"
        );
        assert!(placeholder_image("https://p", "  ").ends_with("?text=No%20Cover"));
    }

    #[test]
    fn test_upgrade_to_https() {
        assert_eq!(upgrade_to_https("http://a.com/x"), "https://a.com/x");
        assert_eq!(upgrade_to_https("HTTP://a.com/x"), "https://a.com/x");
        assert_eq!(upgrade_to_https("https://a.com/x"), "https://a.com/x");
        assert_eq!(upgrade_to_https("/local.png"), "/local.png");
    }

    #[test]
    fn test_retag_link() {
        let old = "https://amazon.com/dp/0132350882?tag=bibliophileai-20";
        assert_eq!(
            retag_link(old, "bibliophileai-20", "busybibliophi-20").as_deref(),
            Some("https://amazon.com/dp/0132350882?tag=busybibliophi-20")
        );

        assert_eq!(
            retag_link("https://amazon.com/dp/1", "bibliophileai-20", "new-20").as_deref(),
            Some("https://amazon.com/dp/1?tag=new-20")
        );
        assert_eq!(
            retag_link("https://amazon.com/s?k=x", "bibliophileai-20", "new-20").as_deref(),
            Some("https://amazon.com/s?k=x&tag=new-20")
        );

        assert!(retag_link("https://amazon.com/s?k=x&tag=new-20", "old-20", "new-20").is_none());
        assert!(retag_link("#", "old-20", "new-20").is_none());
        assert!(retag_link("", "old-20", "new-20").is_none());
    }
}
