// ============================================================================
// UTILS : ENVOI D'EMAILS
// ============================================================================
//
// Description:
//   Mailer SMTP (Gmail, TLS implicite port 465) pour les deux emails du
//   système : notification de blocage de compte et lien de récupération de
//   mot de passe.
//
// Points d'attention:
//   - La notification de blocage est envoyée en fire-and-forget par le
//     notifier du login (tokio::spawn) : aucune garantie de livraison,
//     l'échec est seulement loggé
//   - L'email de récupération, lui, fait partie de la réponse HTTP : son
//     échec remonte en 500
//   - Credentials via EMAIL_USER / EMAIL_PASS dans .env
//
// ============================================================================

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::env;

const SMTP_HOST: &str = "smtp.gmail.com";

pub struct Mailer {
    email_user: Option<String>,
    email_pass: Option<String>,
}

impl Mailer {
    pub fn from_env() -> Self {
        let email_user = env::var("EMAIL_USER").ok();
        let email_pass = env::var("EMAIL_PASS").ok();

        if email_user.is_none() || email_pass.is_none() {
            eprintln!("⚠️  WARNING: EMAIL_USER/EMAIL_PASS not set, emails will fail to send");
        }

        Self { email_user, email_pass }
    }

    async fn send_html(&self, to: &str, subject: &str, html: String) -> Result<(), String> {
        let (user, pass) = match (&self.email_user, &self.email_pass) {
            (Some(user), Some(pass)) => (user.clone(), pass.clone()),
            _ => return Err("EMAIL_USER/EMAIL_PASS not configured".to_string()),
        };

        let message = Message::builder()
            .from(format!("Plaze Soporte <{}>", user)
                .parse()
                .map_err(|e| format!("Invalid sender address: {}", e))?)
            .to(to.parse().map_err(|e| format!("Invalid recipient address: {}", e))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html)
            .map_err(|e| format!("Failed to build email: {}", e))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(SMTP_HOST)
            .map_err(|e| format!("SMTP transport error: {}", e))?
            .credentials(Credentials::new(user, pass))
            .build();

        transport
            .send(message)
            .await
            .map(|_| ())
            .map_err(|e| format!("Email send error: {}", e))
    }

    /// Notification de blocage temporaire (3 échecs de login)
    pub async fn send_lock_email(&self, correo: &str, nombre: &str) -> Result<(), String> {
        let html = format!(
            r#"<html>
  <body style="margin: 0; padding: 0; background-color: #f4f6f8;">
    <table role="presentation" align="center" width="480"
           style="background-color: #ffffff; border-radius: 12px; margin: 40px auto;">
      <tr>
        <td style="padding: 30px 40px; font-family: Arial, sans-serif; color: #333;">
          <h2 style="color: #d93025; text-align: center; margin-top: 0;">
            🔒 Cuenta bloqueada temporalmente
          </h2>
          <p>Hola <b>{nombre}</b>,</p>
          <p style="line-height: 1.6;">
            Detectamos varios intentos fallidos de inicio de sesión en tu cuenta.<br>
            Por seguridad, la cuenta quedó bloqueada durante <b>15 minutos</b>.
          </p>
          <p style="color: #555; font-size: 14px;">
            Si no fuiste tú, te recomendamos cambiar tu contraseña
            cuando el bloqueo expire.
          </p>
          <hr style="border: none; border-top: 1px solid #eee; margin: 25px 0;">
          <p style="color: #777; font-size: 13px; text-align: center;">
            Saludos,<br>
            <b>El equipo de Soporte de Plaze</b>
          </p>
        </td>
      </tr>
    </table>
  </body>
</html>"#
        );

        self.send_html(correo, "🔒 Cuenta bloqueada temporalmente", html).await
    }

    /// Email de récupération de mot de passe avec le lien de reset
    pub async fn send_recovery_email(
        &self,
        correo: &str,
        nombre: &str,
        reset_link: &str,
    ) -> Result<(), String> {
        let html = format!(
            r##"<html>
  <body style="margin: 0; padding: 0; background-color: #f4f6f8;">
    <table role="presentation" align="center" width="480"
           style="background-color: #ffffff; border-radius: 12px; margin: 40px auto;">
      <tr>
        <td style="padding: 30px 40px; font-family: Arial, sans-serif; color: #333;">
          <h2 style="color: #1a73e8; text-align: center; margin-top: 0;">
            🔐 Recuperación de contraseña
          </h2>
          <p>Hola <b>{nombre}</b>,</p>
          <p style="line-height: 1.6;">
            Hemos recibido una solicitud para restablecer tu contraseña.<br>
            Por favor, haz clic en el botón de abajo para continuar:
          </p>
          <table role="presentation" align="center" style="margin: 30px auto;">
            <tr>
              <td align="center" bgcolor="#1a73e8" style="border-radius: 8px;">
                <a href="{reset_link}" target="_blank"
                   style="display: inline-block; padding: 12px 24px; font-size: 16px;
                          font-weight: bold; color: #ffffff; text-decoration: none;
                          border-radius: 8px;">
                  Restablecer contraseña
                </a>
              </td>
            </tr>
          </table>
          <p style="color: #555; font-size: 14px;">
            ⏰ Este enlace expirará en <b>1 hora</b>.<br>
            Si no solicitaste este cambio, puedes ignorar este mensaje.
          </p>
          <hr style="border: none; border-top: 1px solid #eee; margin: 25px 0;">
          <p style="color: #777; font-size: 13px; text-align: center;">
            Saludos,<br>
            <b>El equipo de Soporte de Plaze</b>
          </p>
        </td>
      </tr>
    </table>
  </body>
</html>"##
        );

        self.send_html(correo, "🔐 Recuperación de contraseña", html).await
    }
}
