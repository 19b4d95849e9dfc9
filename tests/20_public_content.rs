mod common;

use anyhow::Result;
use reqwest::StatusCode;
use uuid::Uuid;

use common::{blog, case_study, slugs, TestApp};

#[tokio::test]
async fn blog_listing_is_active_only_and_newest_first() -> Result<()> {
    let app = TestApp::spawn().await?;
    let mut draft = blog("draft", &["rust"], 0);
    draft.active = false;
    for b in [blog("older", &["rust"], 5), blog("newest", &["go"], 1), blog("oldest", &["rust"], 30), draft] {
        app.insert_blog(b).await?;
    }

    let (status, body) = app.get("/api/blogs", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(slugs(&body["data"]["items"]), vec!["newest", "older", "oldest"]);
    assert_eq!(body["data"]["total"], 3);

    let (_, body) = app.get("/api/blogs?tag=rust&limit=1&page=2", None).await?;
    assert_eq!(slugs(&body["data"]["items"]), vec!["oldest"]);
    assert_eq!(body["data"]["total"], 2);
    assert_eq!(body["data"]["pages"], 2);
    Ok(())
}

#[tokio::test]
async fn show_by_slug_hides_inactive_items() -> Result<()> {
    let app = TestApp::spawn().await?;
    let mut hidden = case_study("hidden", &[], 0);
    hidden.active = false;
    app.insert_case_study(hidden).await?;
    app.insert_case_study(case_study("visible", &[], 0)).await?;

    let (status, body) = app.get("/api/case-studies/visible", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["client"], "Acme");

    let (status, body) = app.get("/api/case-studies/hidden", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
    Ok(())
}

#[tokio::test]
async fn related_blogs_rank_by_shared_tags() -> Result<()> {
    let app = TestApp::spawn().await?;
    let reference = app.insert_blog(blog("r", &["AI", "NLP"], 0)).await?;
    app.insert_blog(blog("x", &["AI", "NLP", "Ethics"], 4)).await?;
    app.insert_blog(blog("y", &["AI"], 2)).await?;
    app.insert_blog(blog("z", &["Cooking"], 1)).await?;

    let (status, body) = app
        .get(&format!("/api/related/blogs/{}?limit=2", reference.id), None)
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(slugs(&body["data"]), vec!["x", "y"]);
    Ok(())
}

#[tokio::test]
async fn related_blog_ties_prefer_recent_and_skip_inactive() -> Result<()> {
    let app = TestApp::spawn().await?;
    let reference = app.insert_blog(blog("r", &["rust"], 0)).await?;
    app.insert_blog(blog("old", &["rust"], 20)).await?;
    app.insert_blog(blog("recent", &["rust"], 2)).await?;
    let mut retired = blog("retired", &["rust"], 1);
    retired.active = false;
    app.insert_blog(retired).await?;

    let (_, body) = app.get(&format!("/api/related/blogs/{}", reference.id), None).await?;
    assert_eq!(slugs(&body["data"]), vec!["recent", "old"]);
    Ok(())
}

#[tokio::test]
async fn related_defaults_to_three_blogs_and_four_case_studies() -> Result<()> {
    let app = TestApp::spawn().await?;
    let blog_ref = app.insert_blog(blog("ref", &["t"], 0)).await?;
    let case_ref = app.insert_case_study(case_study("ref", &["t"], 0)).await?;
    for i in 1..=6 {
        app.insert_blog(blog(&format!("b{}", i), &["t"], i)).await?;
        app.insert_case_study(case_study(&format!("c{}", i), &["t"], i)).await?;
    }

    let (_, body) = app.get(&format!("/api/related/blogs/{}", blog_ref.id), None).await?;
    assert_eq!(slugs(&body["data"]).len(), 3);

    let (_, body) = app
        .get(&format!("/api/related/case-studies/{}", case_ref.id), None)
        .await?;
    assert_eq!(slugs(&body["data"]).len(), 4);

    // Non-positive or garbage limits fall back to the default
    let (_, body) = app
        .get(&format!("/api/related/blogs/{}?limit=-1", blog_ref.id), None)
        .await?;
    assert_eq!(slugs(&body["data"]).len(), 3);
    let (status, body) = app
        .get(&format!("/api/related/blogs/{}?limit=many", blog_ref.id), None)
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(slugs(&body["data"]).len(), 3);
    Ok(())
}

#[tokio::test]
async fn related_case_study_ties_keep_listing_order() -> Result<()> {
    let app = TestApp::spawn().await?;
    let reference = app.insert_case_study(case_study("r", &["fintech", "ml"], 0)).await?;
    app.insert_case_study(case_study("first-made", &["fintech"], 9)).await?;
    app.insert_case_study(case_study("last-made", &["fintech"], 1)).await?;
    app.insert_case_study(case_study("best", &["fintech", "ml"], 30)).await?;

    let (_, body) = app
        .get(&format!("/api/related/case-studies/{}", reference.id), None)
        .await?;
    // Score first; equal scores in creation order, newest first
    assert_eq!(slugs(&body["data"]), vec!["best", "last-made", "first-made"]);
    Ok(())
}

#[tokio::test]
async fn related_for_unknown_or_malformed_id_is_empty() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.insert_blog(blog("lonely", &["a"], 0)).await?;

    for path in [
        format!("/api/related/blogs/{}", Uuid::new_v4()),
        "/api/related/blogs/not-a-uuid".to_string(),
        format!("/api/related/case-studies/{}", Uuid::new_v4()),
    ] {
        let (status, body) = app.get(&path, None).await?;
        assert_eq!(status, StatusCode::OK, "{}", path);
        assert_eq!(body["data"], serde_json::json!([]), "{}", path);
    }
    Ok(())
}

#[tokio::test]
async fn related_is_stable_across_calls() -> Result<()> {
    let app = TestApp::spawn().await?;
    let reference = app.insert_blog(blog("r", &["a", "b"], 0)).await?;
    for (i, tags) in [&["a"][..], &["b"], &["a", "b"], &["c"]].into_iter().enumerate() {
        app.insert_blog(blog(&format!("p{}", i), tags, i as i64 + 1)).await?;
    }

    let path = format!("/api/related/blogs/{}?limit=10", reference.id);
    let (_, first) = app.get(&path, None).await?;
    let (_, second) = app.get(&path, None).await?;
    assert_eq!(first["data"], second["data"]);
    assert!(!slugs(&first["data"]).contains(&"r".to_string()));
    Ok(())
}
