mod common;

use common::fake_remote::FakeRemote;
use common::{drain_notices, wait_until};
use lulutong::client::{AuthForm, AuthMode, ClientError, NoticeLevel, Notifier, Session};
use std::time::Duration;

#[tokio::test]
async fn test_session_is_not_ready_until_first_notification() {
    let fake = FakeRemote::new();
    fake.delay_next("current_user", Duration::from_millis(50));

    let session = Session::start(fake.clone());
    assert!(!session.is_ready());

    session.wait_ready().await;
    assert!(session.is_ready());
    assert_eq!(session.current_user(), None);
    assert_eq!(session.greeting(), "欢迎，我的账户！");
}

#[tokio::test]
async fn test_existing_session_resolves_profile() {
    let fake = FakeRemote::new();
    let user = fake.seed_user("lu@ruc.edu.cn", Some("小鹿"));
    fake.set_session(Some(user.clone()));

    let session = Session::start(fake.clone());
    session.wait_ready().await;

    assert_eq!(session.current_user(), Some(user.clone()));
    assert_eq!(session.profile().unwrap().id, user.id);
    assert_eq!(session.greeting(), "欢迎，小鹿！");
}

#[tokio::test]
async fn test_sign_in_through_form_updates_session() {
    let fake = FakeRemote::new();
    let user = fake.seed_user("lu@ruc.edu.cn", Some("小鹿"));
    let session = Session::start(fake.clone());
    session.wait_ready().await;
    assert_eq!(session.current_user(), None);

    let (notifier, mut rx) = Notifier::channel();
    let form = AuthForm::new(fake.clone(), notifier);
    form.set_email("lu@ruc.edu.cn");
    form.set_password("password");
    form.submit().await.unwrap();

    wait_until(|| session.current_user().is_some()).await;
    assert_eq!(session.current_user().unwrap().id, user.id);
    wait_until(|| session.profile().is_some()).await;
    assert_eq!(session.greeting(), "欢迎，小鹿！");
    assert_eq!(drain_notices(&mut rx)[0].text, "登录成功！欢迎回来！");

    form.sign_out().await.unwrap();
    wait_until(|| session.current_user().is_none()).await;
    assert!(session.is_ready());
}

#[tokio::test]
async fn test_sign_up_mode_creates_account() {
    let fake = FakeRemote::new();
    let session = Session::start(fake.clone());
    session.wait_ready().await;

    let (notifier, mut rx) = Notifier::channel();
    let form = AuthForm::new(fake.clone(), notifier);
    assert_eq!(form.toggle_mode(), AuthMode::SignUp);
    form.set_email("new@ruc.edu.cn");
    form.set_password("secret1");
    let user = form.submit().await.unwrap();

    wait_until(|| session.current_user().is_some()).await;
    assert_eq!(session.current_user().unwrap().id, user.id);
    assert_eq!(fake.count("sign_up"), 1);
    assert_eq!(fake.count("sign_in"), 0);
    assert_eq!(drain_notices(&mut rx)[0].text, "注册成功！请检查邮箱完成验证。");
}

#[tokio::test]
async fn test_wrong_password_notifies() {
    let fake = FakeRemote::new();
    fake.seed_user("lu@ruc.edu.cn", None);

    let (notifier, mut rx) = Notifier::channel();
    let form = AuthForm::new(fake.clone(), notifier);
    form.set_email("lu@ruc.edu.cn");
    form.set_password("wrong");

    assert!(form.submit().await.is_err());
    assert_eq!(drain_notices(&mut rx)[0].text, "登录失败：Unauthorized");
}

#[tokio::test]
async fn test_empty_credentials_are_not_sent() {
    let fake = FakeRemote::new();
    let (notifier, mut rx) = Notifier::channel();
    let form = AuthForm::new(fake.clone(), notifier);
    form.set_email("lu@ruc.edu.cn");

    assert!(matches!(
        form.submit().await,
        Err(ClientError::Validation(_))
    ));
    assert!(fake.calls().is_empty());
    let notices = drain_notices(&mut rx);
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert_eq!(notices[0].text, "请输入邮箱和密码");
}

#[tokio::test]
async fn test_profile_failure_still_marks_ready() {
    let fake = FakeRemote::new();
    let user = fake.seed_user("lu@ruc.edu.cn", Some("小鹿"));
    fake.set_session(Some(user.clone()));
    fake.fail("profile");

    let session = Session::start(fake.clone());
    session.wait_ready().await;

    assert_eq!(session.current_user(), Some(user));
    assert_eq!(session.profile(), None);
    assert_eq!(session.greeting(), "欢迎，我的账户！");
}

#[tokio::test]
async fn test_stopped_session_ignores_later_changes() {
    let fake = FakeRemote::new();
    let user = fake.seed_user("lu@ruc.edu.cn", None);
    let session = Session::start(fake.clone());
    let watch = session.watch();
    session.wait_ready().await;

    session.stop();
    tokio::task::yield_now().await;
    fake.set_session(Some(user));
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(watch.borrow().user, None);
    assert_eq!(fake.count("profile"), 0);
}

#[tokio::test]
async fn test_sign_in_during_initial_lookup_is_applied() {
    let fake = FakeRemote::new();
    let user = fake.seed_user("lu@ruc.edu.cn", Some("小鹿"));
    fake.delay_next("current_user", Duration::from_millis(100));

    let session = Session::start(fake.clone());
    wait_until(|| fake.count("current_user") == 1).await;
    fake.set_session(Some(user.clone()));

    session.wait_ready().await;
    wait_until(|| session.current_user().is_some()).await;
    assert_eq!(session.current_user().unwrap().id, user.id);
}
