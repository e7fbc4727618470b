use anyhow::{bail, Context};
use shared::types::Result;
use shared::utils::is_json_file;
use std::path::Path;

/// Play-store reviews of a banking app, used when no corpus file is given.
pub const SAMPLE_REVIEWS: [&str; 11] = [
    "The payments menu, including payments between my accounts, has recently stopped working properly. When you enter it, it freezes. To recover, I must go to apps and delete app data  clearing only the cache is ineffective. But it will only work for a short time before the bug takes effect again... Once this is resolved, I will revise my one-star rating.",
    "The app needs improvement on some functionalities (like preselection of periods of time in reports- I always have to filter and select custom period to see more months), but recently I experienced a lot of app crashes or blocked functions such as transfers between personal accounts and payments. It just freezes. And this happened on a separate phone as well for a different account!",
    "I had the app since many years now. It had its share of bad days as well. It still crushes now, but to be honest quite rarely. All in all I am happy with this app as it allows me to easily do online payments and it \"feels\" secure enough. In the most recent updates, the new interface - I find it less user friendly and less intuitive than former versions. But I was still able to navigate it and find what I need. It does not excel, but, in my opinion, it's a pretty decent banking up.",
    "I saw good improvements in the app lately and it's more stable. Improvement points: 1. Bring back the Favorite button, one level up 2. Improve for less use of data, so that when the internet connection is not 4G or more, to still work a bit. 3. Top-ups requests from Revolut don't always work as intended. After confirming in HomeBank, sometimes the information is not sent to Revolut. Thank you and keep up the good work!",
    "Feature-wise it's a really great app, intuitive and easy to figure out. I like the new Round up functionality. The fingerprint authentication doesn't work on my device, but that doesn't bother me too much. Performance-wise however it's really bad. It has always been slow, but with the last updates it takes 30 seconds just to load any screen after navigation (portfolio, payments etc). So if for example you login, go to payments, then to my payments and open an entry, that's 2 minutes of loading",
    "please add dark mode, it's to bright according with today standards and it consume more energy.",
    "Perfect app. It is verry easy to use. Transfers are a piece of cake. It is safe. Customer service has been always excelent. People in the bank go above and beyond to offer u support. Even though some people might complain about some features i do believe is because rhey are not familiar with the app. I learned a lot about the app by calling the customer support or going to the bank directly. For me this is a reliable bank abd app.",
    "Ing bazar has stopped working, and I used to use it a lot. Now, no matter the update, it doesn't work.",
    "The app doesn't work anymore.It is closing after loading process. I tried already to delete the cache and reinstall the app but it still useless.",
    "Almost perfect - when it will have dark mode, it will be perfect!",
    "I may consider moving to another bank just because of the app appearance. I asked everywhere for a dark mode in this app. There is no option even if my first request was 2 years ago. For 2023 it's very disappointing to be honest. I'm looking forward a reply from the devs.",
];

pub fn sample_reviews() -> Vec<String> {
    SAMPLE_REVIEWS.iter().map(|s| s.to_string()).collect()
}

/// Loads review texts from `path`: a JSON array of strings for `.json`
/// files, otherwise one review per non-blank line.
pub fn load_corpus(path: &Path) -> Result<Vec<String>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading corpus {}", path.display()))?;
    let texts = parse_corpus(&raw, is_json_file(path))
        .with_context(|| format!("parsing corpus {}", path.display()))?;
    if texts.is_empty() {
        bail!("corpus {} contains no reviews", path.display());
    }
    Ok(texts)
}

fn parse_corpus(raw: &str, json: bool) -> Result<Vec<String>> {
    let texts: Vec<String> = if json {
        serde_json::from_str(raw)?
    } else {
        raw.lines().map(str::trim).map(String::from).collect()
    };
    Ok(texts.into_iter().filter(|t| !t.trim().is_empty()).collect())
}
