pub(super) const INSERT_POST: &str = r#"
    INSERT INTO community_posts (
        id,
        title,
        content,
        author_id,
        category,
        visible,
        media_urls,
        created_at,
        updated_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
"#;

pub(super) const SELECT_POST_BY_ID: &str = r#"
    SELECT p.id,
           p.title,
           p.content,
           p.author_id,
           p.category,
           p.visible,
           p.media_urls,
           p.created_at,
           p.updated_at,
           pr.display_name AS author_display_name,
           pr.email AS author_email
    FROM community_posts p
    LEFT JOIN profiles pr ON pr.user_id = p.author_id
    WHERE p.id = ?1
"#;

pub(super) const SELECT_ALL_POSTS: &str = r#"
    SELECT p.id,
           p.title,
           p.content,
           p.author_id,
           p.category,
           p.visible,
           p.media_urls,
           p.created_at,
           p.updated_at,
           pr.display_name AS author_display_name,
           pr.email AS author_email
    FROM community_posts p
    LEFT JOIN profiles pr ON pr.user_id = p.author_id
    ORDER BY p.created_at DESC, p.id DESC
"#;

pub(super) const SELECT_VISIBLE_POSTS: &str = r#"
    SELECT p.id,
           p.title,
           p.content,
           p.author_id,
           p.category,
           p.visible,
           p.media_urls,
           p.created_at,
           p.updated_at,
           pr.display_name AS author_display_name,
           pr.email AS author_email
    FROM community_posts p
    LEFT JOIN profiles pr ON pr.user_id = p.author_id
    WHERE p.visible = 1
    ORDER BY p.created_at DESC, p.id DESC
"#;

pub(super) const UPDATE_POST_FIELDS: &str = r#"
    UPDATE community_posts
    SET title = COALESCE(?1, title),
        content = COALESCE(?2, content),
        category = COALESCE(?3, category),
        updated_at = ?4
    WHERE id = ?5
"#;

pub(super) const SET_POST_VISIBILITY: &str = r#"
    UPDATE community_posts
    SET visible = ?1, updated_at = ?2
    WHERE id = ?3
"#;

pub(super) const DELETE_POST: &str = r#"
    DELETE FROM community_posts
    WHERE id = ?1
"#;

pub(super) const DELETE_POST_COMMENTS: &str = r#"
    DELETE FROM community_comments
    WHERE post_id = ?1
"#;

pub(super) const DELETE_POST_LIKES: &str = r#"
    DELETE FROM community_likes
    WHERE post_id = ?1
"#;

pub(super) const SELECT_POST_EXISTS: &str = r#"
    SELECT 1 FROM community_posts WHERE id = ?1
"#;

pub(super) const INSERT_COMMENT: &str = r#"
    INSERT INTO community_comments (id, post_id, author_id, content, created_at)
    VALUES (?1, ?2, ?3, ?4, ?5)
"#;

pub(super) const SELECT_COMMENT_BY_ID: &str = r#"
    SELECT c.id,
           c.post_id,
           c.author_id,
           c.content,
           c.created_at,
           pr.display_name AS author_display_name,
           pr.email AS author_email
    FROM community_comments c
    LEFT JOIN profiles pr ON pr.user_id = c.author_id
    WHERE c.id = ?1
"#;

pub(super) const SELECT_COMMENTS_BY_POST: &str = r#"
    SELECT c.id,
           c.post_id,
           c.author_id,
           c.content,
           c.created_at,
           pr.display_name AS author_display_name,
           pr.email AS author_email
    FROM community_comments c
    LEFT JOIN profiles pr ON pr.user_id = c.author_id
    WHERE c.post_id = ?1
    ORDER BY c.created_at ASC, c.id ASC
"#;

pub(super) const SELECT_LIKE_ID_BY_POST_AND_USER: &str = r#"
    SELECT id FROM community_likes
    WHERE post_id = ?1 AND user_id = ?2
"#;

pub(super) const INSERT_LIKE: &str = r#"
    INSERT INTO community_likes (id, post_id, user_id, created_at)
    VALUES (?1, ?2, ?3, ?4)
    ON CONFLICT(post_id, user_id) DO NOTHING
"#;

pub(super) const DELETE_LIKE_BY_ID: &str = r#"
    DELETE FROM community_likes
    WHERE id = ?1
"#;

pub(super) const UPSERT_PROFILE: &str = r#"
    INSERT INTO profiles (id, user_id, email, display_name, role, member_status)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
    ON CONFLICT(user_id) DO UPDATE SET
        email = excluded.email,
        display_name = excluded.display_name,
        role = excluded.role,
        member_status = excluded.member_status
"#;

pub(super) const SELECT_PROFILE_BY_USER: &str = r#"
    SELECT id, user_id, email, display_name, role, member_status
    FROM profiles
    WHERE user_id = ?1
"#;
