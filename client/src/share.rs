use blog_models::{Id, Post};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharePlatform {
    Twitter,
    Facebook,
    LinkedIn,
    WhatsApp,
    CopyLink,
}

/// Where a share action leads: an external page to open, or text for the
/// clipboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareTarget {
    Open(Url),
    Clipboard(String),
}

/// Canonical detail-page URL of a post on the public site.
pub fn post_url(site: &Url, id: &Id) -> Result<Url, url::ParseError> {
    site.join(&format!("post/{id}"))
}

pub fn share_target(
    site: &Url,
    post: &Post,
    platform: SharePlatform,
) -> Result<ShareTarget, url::ParseError> {
    let link = post_url(site, &post.id)?;
    let link = link.as_str();

    let url = match platform {
        SharePlatform::Twitter => Url::parse_with_params(
            "https://twitter.com/intent/tweet",
            &[("url", link), ("text", post.title.as_str())],
        )?,
        SharePlatform::Facebook => {
            Url::parse_with_params("https://www.facebook.com/sharer/sharer.php", &[("u", link)])?
        }
        SharePlatform::LinkedIn => Url::parse_with_params(
            "https://www.linkedin.com/sharing/share-offsite/",
            &[("url", link)],
        )?,
        SharePlatform::WhatsApp => Url::parse_with_params(
            "https://wa.me/",
            &[("text", format!("{} {}", post.title, link).as_str())],
        )?,
        SharePlatform::CopyLink => return Ok(ShareTarget::Clipboard(link.to_string())),
    };

    Ok(ShareTarget::Open(url))
}

#[cfg(test)]
mod tests {
    use super::*;
    use blog_models::Category;
    use chrono::Utc;

    fn post() -> Post {
        Post {
            id: Id::from("12"),
            title: "Kyoto & tea".into(),
            description: "Temples".into(),
            image_url: String::new(),
            category: Category::Travel,
            user_id: Id::from("3"),
            likes: 0,
            likes_history: vec![],
            comments: vec![],
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn site() -> Url {
        Url::parse("https://blog.example/").unwrap()
    }

    #[test]
    fn copy_link_is_the_canonical_url() {
        let target = share_target(&site(), &post(), SharePlatform::CopyLink).unwrap();
        assert_eq!(
            target,
            ShareTarget::Clipboard("https://blog.example/post/12".into())
        );
    }

    #[test]
    fn twitter_link_carries_encoded_url_and_title() {
        let ShareTarget::Open(url) = share_target(&site(), &post(), SharePlatform::Twitter).unwrap()
        else {
            panic!("expected an external link");
        };

        assert_eq!(url.host_str(), Some("twitter.com"));
        let params: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(params.contains(&("url".into(), "https://blog.example/post/12".into())));
        assert!(params.contains(&("text".into(), "Kyoto & tea".into())));
    }

    #[test]
    fn every_external_platform_opens_a_link() {
        for platform in [
            SharePlatform::Facebook,
            SharePlatform::LinkedIn,
            SharePlatform::WhatsApp,
        ] {
            assert!(matches!(
                share_target(&site(), &post(), platform).unwrap(),
                ShareTarget::Open(_)
            ));
        }
    }
}
